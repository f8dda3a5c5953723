/// Format milliseconds as `MM:SS.d`
pub fn format_time(ms: u64) -> String {
    let seconds = ms / 1000;
    let deciseconds = (ms % 1000) / 100;
    let minutes = seconds / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}.{}", minutes, secs, deciseconds)
}
