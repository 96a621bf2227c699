#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f32),
    Percent(f32),
    Zero,
}

impl Length {
    pub const fn px(value: f32) -> Self {
        Self::Px(value)
    }

    pub const fn percent(value: f32) -> Self {
        Self::Percent(value)
    }

    /// Accepts `12`, `12px` and `50%`. Non-finite numbers are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (number, percent) = match raw.strip_suffix('%') {
            Some(number) => (number, true),
            None => (raw.strip_suffix("px").unwrap_or(raw), false),
        };
        let value: f32 = number.trim().parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some(match (percent, value == 0.0) {
            (_, true) => Self::Zero,
            (true, false) => Self::Percent(value),
            (false, false) => Self::Px(value),
        })
    }

    pub fn resolve(self, base: f32) -> f32 {
        match self {
            Self::Px(v) => v,
            Self::Percent(v) => base.max(0.0) * v * 0.01,
            Self::Zero => 0.0,
        }
    }

    pub const fn is_relative(self) -> bool {
        matches!(self, Self::Percent(_))
    }
}

impl Default for Length {
    fn default() -> Self {
        Self::Zero
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SizeValue {
    #[default]
    Auto,
    Length(Length),
}

impl SizeValue {
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().eq_ignore_ascii_case("auto") {
            return Some(Self::Auto);
        }
        Length::parse(raw).map(Self::Length)
    }

    pub const fn is_relative(self) -> bool {
        match self {
            Self::Auto => true,
            Self::Length(length) => length.is_relative(),
        }
    }
}
