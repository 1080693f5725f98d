//! Mach-number distributions from a method-of-characteristics solution.

use crate::error::{ChannelError, ChannelResult};
use std::path::Path;

/// Axial Mach-number profile `(x, Ma)`, linear between points.
#[derive(Debug, Clone, PartialEq)]
pub struct MocProfile {
    x: Vec<f64>,
    mach: Vec<f64>,
}

impl MocProfile {
    pub fn new(x: Vec<f64>, mach: Vec<f64>) -> ChannelResult<Self> {
        if x.len() < 2 || x.len() != mach.len() {
            return Err(ChannelError::InvalidArg {
                what: "MoC profile needs at least two (x, Ma) pairs",
            });
        }
        if x.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(ChannelError::InvalidArg {
                what: "MoC x must increase strictly",
            });
        }
        if mach.iter().any(|m| !(m.is_finite() && *m >= 0.0)) {
            return Err(ChannelError::InvalidArg {
                what: "MoC Mach numbers must be non-negative",
            });
        }
        Ok(Self { x, mach })
    }

    /// Parse two columns separated by whitespace or commas. Blank lines and
    /// lines starting with `#` are skipped.
    pub fn parse(text: &str) -> ChannelResult<Self> {
        let mut x = Vec::new();
        let mut mach = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cols: Vec<&str> = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .collect();
            if cols.len() != 2 {
                return Err(ChannelError::Parse {
                    line: i + 1,
                    message: format!("expected two columns, found {}", cols.len()),
                });
            }
            let value = |s: &str| {
                s.parse::<f64>().map_err(|e| ChannelError::Parse {
                    line: i + 1,
                    message: format!("{s}: {e}"),
                })
            };
            x.push(value(cols[0])?);
            mach.push(value(cols[1])?);
        }
        Self::new(x, mach)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ChannelResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| ChannelError::Parse {
            line: 0,
            message: format!("{}: {e}", path.as_ref().display()),
        })?;
        Self::parse(&text)
    }

    pub fn span(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// Mach number at `x`, clamped to the end values outside the span.
    pub fn mach_at(&self, x: f64) -> f64 {
        let (a, b) = self.span();
        let x = x.clamp(a, b);
        let last = self.x.len() - 2;
        let i = self.x.partition_point(|xi| *xi <= x).saturating_sub(1).min(last);
        let t = (x - self.x[i]) / (self.x[i + 1] - self.x[i]);
        self.mach[i] + t * (self.mach[i + 1] - self.mach[i])
    }

    /// Mach number at channel position `x` of a channel spanning
    /// `[start, end]`, mapped linearly onto the profile span.
    pub fn project(&self, x: f64, start: f64, end: f64) -> f64 {
        let (a, b) = self.span();
        let s = if end > start { (x - start) / (end - start) } else { 0.0 };
        self.mach_at(a + s * (b - a))
    }
}
