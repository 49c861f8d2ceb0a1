use serde::{Deserialize, Serialize};

/// How strongly a tile's performance reads, from strong loss to strong gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    StrongLoss,
    Loss,
    SlightLoss,
    Flat,
    SlightGain,
    Gain,
    StrongGain,
}

impl PerformanceBand {
    /// Classify a return in percent. Thresholds are ±1.5 and ±3 points;
    /// exactly zero (or NaN) is flat.
    pub fn classify(performance: f64) -> Self {
        if performance > 3.0 {
            PerformanceBand::StrongGain
        } else if performance > 1.5 {
            PerformanceBand::Gain
        } else if performance > 0.0 {
            PerformanceBand::SlightGain
        } else if performance < -3.0 {
            PerformanceBand::StrongLoss
        } else if performance < -1.5 {
            PerformanceBand::Loss
        } else if performance < 0.0 {
            PerformanceBand::SlightLoss
        } else {
            PerformanceBand::Flat
        }
    }

    /// Fill opacity: stronger moves are more opaque.
    pub fn intensity(self) -> f32 {
        match self {
            PerformanceBand::StrongGain | PerformanceBand::StrongLoss => 0.6,
            PerformanceBand::Gain | PerformanceBand::Loss => 0.4,
            PerformanceBand::SlightGain | PerformanceBand::SlightLoss | PerformanceBand::Flat => 0.2,
        }
    }

    pub fn is_gain(self) -> bool {
        matches!(
            self,
            PerformanceBand::SlightGain | PerformanceBand::Gain | PerformanceBand::StrongGain
        )
    }

    pub fn is_loss(self) -> bool {
        matches!(
            self,
            PerformanceBand::SlightLoss | PerformanceBand::Loss | PerformanceBand::StrongLoss
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    /// Saturation multiplier, clamped to 0.6–2.0
    pub vibrancy: f32,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self { vibrancy: 1.0 }
    }
}

/// RGBA colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl TileColor {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// `#rrggbb`, alpha dropped.
    pub fn to_hex(self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", c(self.r), c(self.g), c(self.b))
    }
}

impl Serialize for TileColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("TileColor", 2)?;
        s.serialize_field("hex", &self.to_hex())?;
        s.serialize_field("alpha", &self.a)?;
        s.end()
    }
}

/// Emerald for gains, rose for losses, slate when flat.
pub fn band_color(band: PerformanceBand, settings: &ColorSettings) -> TileColor {
    let base = if band.is_gain() {
        hsv_to_rgb(152.0 / 360.0, 0.84, 0.59)
    } else if band.is_loss() {
        hsv_to_rgb(347.0 / 360.0, 0.86, 0.88)
    } else {
        hsv_to_rgb(217.0 / 360.0, 0.43, 0.23)
    };
    apply_vibrancy(base, settings.vibrancy).with_alpha(band.intensity())
}

/// Text colour for the performance figure on a tile.
pub fn band_text_color(band: PerformanceBand) -> TileColor {
    if band.is_gain() {
        hsv_to_rgb(156.0 / 360.0, 0.73, 0.83)
    } else if band.is_loss() {
        hsv_to_rgb(351.0 / 360.0, 0.71, 0.98)
    } else {
        hsv_to_rgb(215.0 / 360.0, 0.18, 0.72)
    }
}

fn apply_vibrancy(color: TileColor, vibrancy: f32) -> TileColor {
    let (h, s, v) = rgb_to_hsv(color);
    let s = (s * vibrancy.clamp(0.6, 2.0)).clamp(0.0, 1.0);
    hsv_to_rgb(h, s, v).with_alpha(color.a)
}

fn rgb_to_hsv(c: TileColor) -> (f32, f32, f32) {
    let max = c.r.max(c.g.max(c.b));
    let min = c.r.min(c.g.min(c.b));
    let d = max - min;
    let h = if d <= 1e-6 {
        0.0
    } else if (max - c.r).abs() <= 1e-6 {
        ((c.g - c.b) / d).rem_euclid(6.0) / 6.0
    } else if (max - c.g).abs() <= 1e-6 {
        (((c.b - c.r) / d) + 2.0) / 6.0
    } else {
        (((c.r - c.g) / d) + 4.0) / 6.0
    };
    let s = if max <= 1e-6 { 0.0 } else { d / max };
    (h, s, max)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> TileColor {
    let h6 = (h * 6.0).rem_euclid(6.0);
    let i = h6.floor() as i32;
    let f = h6 - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match i {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    TileColor::new(r, g, b)
}
