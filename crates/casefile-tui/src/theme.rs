use crossterm::style::Color;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub bg: Color,
    /// Default text color
    pub fg: Color,
    /// Slot border color
    pub border: Color,
    /// Hint text inside empty slots
    pub hint: Color,
    /// Selected piece highlight
    pub selected_bg: Color,
    /// Pieces already on the board
    pub used: Color,
    /// Game over / rejection color
    pub error: Color,
    /// Resolved round color
    pub success: Color,
    /// Timer/info text color
    pub info: Color,
    /// Timer color when little time is left
    pub warning: Color,
    /// Key binding text color
    pub key: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb { r: 20, g: 22, b: 30 },
            fg: Color::Rgb { r: 230, g: 230, b: 240 },
            border: Color::Rgb { r: 130, g: 140, b: 170 },
            hint: Color::Rgb { r: 140, g: 150, b: 180 },
            selected_bg: Color::Rgb { r: 70, g: 90, b: 140 },
            used: Color::Rgb { r: 70, g: 75, b: 90 },
            error: Color::Rgb { r: 255, g: 90, b: 90 },
            success: Color::Rgb { r: 90, g: 255, b: 130 },
            info: Color::Rgb { r: 160, g: 165, b: 185 },
            warning: Color::Rgb { r: 255, g: 170, b: 60 },
            key: Color::Rgb { r: 255, g: 210, b: 100 },
        }
    }
}

/// Parse a `#rrggbb` piece colour
pub fn parse_hex(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}
