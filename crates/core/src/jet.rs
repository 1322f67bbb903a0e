//! Second-order forward-mode differentiation over time.
//!
//! A [`Jet`] carries a value together with its first and second derivative with
//! respect to time. Shape curves are written once as ordinary expressions over a
//! jet seeded with [`Jet::time`], and the velocity and acceleration fall out of
//! the arithmetic exactly.

use std::ops::{Add, Div, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Jet {
    pub value: f64,
    /// d/dt
    pub rate: f64,
    /// d²/dt²
    pub accel: f64,
}

impl Jet {
    #[inline]
    pub const fn constant(value: f64) -> Self {
        Self {
            value,
            rate: 0.0,
            accel: 0.0,
        }
    }

    /// The independent variable itself, evaluated at `t`.
    #[inline]
    pub const fn time(t: f64) -> Self {
        Self {
            value: t,
            rate: 1.0,
            accel: 0.0,
        }
    }

    #[inline]
    pub fn sin(self) -> Self {
        let (s, c) = self.value.sin_cos();
        Self {
            value: s,
            rate: c * self.rate,
            accel: c * self.accel - s * self.rate * self.rate,
        }
    }

    #[inline]
    pub fn cos(self) -> Self {
        let (s, c) = self.value.sin_cos();
        Self {
            value: c,
            rate: -s * self.rate,
            accel: -s * self.accel - c * self.rate * self.rate,
        }
    }
}

impl Add for Jet {
    type Output = Jet;

    #[inline]
    fn add(self, rhs: Jet) -> Jet {
        Jet {
            value: self.value + rhs.value,
            rate: self.rate + rhs.rate,
            accel: self.accel + rhs.accel,
        }
    }
}

impl Add<f64> for Jet {
    type Output = Jet;

    #[inline]
    fn add(self, rhs: f64) -> Jet {
        Jet {
            value: self.value + rhs,
            ..self
        }
    }
}

impl Sub for Jet {
    type Output = Jet;

    #[inline]
    fn sub(self, rhs: Jet) -> Jet {
        self + (-rhs)
    }
}

impl Neg for Jet {
    type Output = Jet;

    #[inline]
    fn neg(self) -> Jet {
        Jet {
            value: -self.value,
            rate: -self.rate,
            accel: -self.accel,
        }
    }
}

impl Mul for Jet {
    type Output = Jet;

    #[inline]
    fn mul(self, rhs: Jet) -> Jet {
        Jet {
            value: self.value * rhs.value,
            rate: self.rate * rhs.value + self.value * rhs.rate,
            accel: self.accel * rhs.value
                + 2.0 * self.rate * rhs.rate
                + self.value * rhs.accel,
        }
    }
}

impl Mul<f64> for Jet {
    type Output = Jet;

    #[inline]
    fn mul(self, k: f64) -> Jet {
        Jet {
            value: self.value * k,
            rate: self.rate * k,
            accel: self.accel * k,
        }
    }
}

impl Mul<Jet> for f64 {
    type Output = Jet;

    #[inline]
    fn mul(self, jet: Jet) -> Jet {
        jet * self
    }
}

impl Div for Jet {
    type Output = Jet;

    /// Quotient rule, written in terms of the quotient itself.
    #[inline]
    fn div(self, rhs: Jet) -> Jet {
        let value = self.value / rhs.value;
        let rate = (self.rate - value * rhs.rate) / rhs.value;
        let accel = (self.accel - 2.0 * rate * rhs.rate - value * rhs.accel) / rhs.value;
        Jet { value, rate, accel }
    }
}
