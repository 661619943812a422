use serde::{Deserialize, Serialize};

/// A non-negative rational amount, always stored in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quantity {
    numer: u64,
    denom: u64,
}

impl Quantity {
    /// Returns `None` for a zero denominator.
    pub fn new(numer: u64, denom: u64) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        let g = gcd(numer, denom).max(1);
        Some(Self {
            numer: numer / g,
            denom: denom / g,
        })
    }

    pub fn whole(n: u64) -> Self {
        Self { numer: n, denom: 1 }
    }

    pub fn numer(&self) -> u64 {
        self.numer
    }

    pub fn denom(&self) -> u64 {
        self.denom
    }

    pub fn as_f64(&self) -> f64 {
        self.numer as f64 / self.denom as f64
    }

    /// Parse a numeral: integer ("2"), decimal ("1.5"), fraction ("3/4"),
    /// or mixed number ("1 1/2", "1-1/2").
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let mut parts = text.split(|c: char| c.is_whitespace() || c == '-').filter(|p| !p.is_empty());
        let first = parts.next()?;
        let second = parts.next();
        if parts.next().is_some() {
            return None;
        }

        match second {
            None => parse_simple(first),
            Some(frac) => {
                if first.contains('/') || first.contains('.') || !frac.contains('/') {
                    return None;
                }
                let whole: u64 = first.parse().ok()?;
                let fraction = parse_fraction(frac)?;
                Self::new(
                    whole.checked_mul(fraction.denom)?.checked_add(fraction.numer)?,
                    fraction.denom,
                )
            }
        }
    }
}

fn parse_simple(s: &str) -> Option<Quantity> {
    if s.contains('/') {
        return parse_fraction(s);
    }
    if let Some((int_part, frac_part)) = s.split_once('.') {
        if frac_part.is_empty() || !frac_part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let int: u64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().ok()?
        };
        let scale = 10u64.checked_pow(frac_part.len() as u32)?;
        let frac: u64 = frac_part.parse().ok()?;
        return Quantity::new(int.checked_mul(scale)?.checked_add(frac)?, scale);
    }
    s.parse().ok().map(Quantity::whole)
}

fn parse_fraction(s: &str) -> Option<Quantity> {
    let (n, d) = s.split_once('/')?;
    Quantity::new(n.parse().ok()?, d.parse().ok()?)
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let whole = self.numer / self.denom;
        let rest = self.numer % self.denom;
        match (whole, rest) {
            (w, 0) => write!(f, "{w}"),
            (0, r) => write!(f, "{r}/{}", self.denom),
            (w, r) => write!(f, "{w} {r}/{}", self.denom),
        }
    }
}
