//! Définitions des ellipsoïdes

/// Ellipsoïde de révolution, défini par son demi-grand axe et son aplatissement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    a: f64,
    f: f64,
}

impl Ellipsoid {
    /// WGS84
    pub const WGS84: Ellipsoid = Ellipsoid::new(6378137.0, 1.0 / 298.257223563);

    /// GRS80 (RGF93, ETRS89, NAD83).
    /// Quasi identique à WGS84, différence < 0.1mm
    pub const GRS80: Ellipsoid = Ellipsoid::new(6378137.0, 1.0 / 298.257222101);

    pub const CLARKE_1866: Ellipsoid = Ellipsoid::new(6378206.4, 1.0 / 294.9786982);
    pub const INTERNATIONAL_1924: Ellipsoid = Ellipsoid::new(6378388.0, 1.0 / 297.0);
    pub const BESSEL_1841: Ellipsoid = Ellipsoid::new(6377397.155, 1.0 / 299.1528128);

    pub const fn new(a: f64, f: f64) -> Self {
        Self { a, f }
    }

    /// Sphère de rayon `r`
    pub const fn sphere(r: f64) -> Self {
        Self { a: r, f: 0.0 }
    }

    /// Depuis les demi-axes
    pub fn from_axes(a: f64, b: f64) -> Self {
        Self { a, f: (a - b) / a }
    }

    /// Ellipsoïde nommé à la manière des paramètres `+ellps` / `+datum`
    pub fn from_name(name: &str) -> Option<Self> {
        let e = match name.to_ascii_uppercase().as_str() {
            "WGS84" => Self::WGS84,
            "GRS80" | "NAD83" | "ETRS89" | "RGF93" => Self::GRS80,
            "CLRK66" | "NAD27" => Self::CLARKE_1866,
            "INTL" => Self::INTERNATIONAL_1924,
            "BESSEL" => Self::BESSEL_1841,
            _ => return None,
        };
        Some(e)
    }

    /// Demi-grand axe (rayon équatorial) en mètres
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Aplatissement
    pub fn f(&self) -> f64 {
        self.f
    }

    /// Demi-petit axe (rayon polaire) en mètres
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// Première excentricité au carré
    pub fn e2(&self) -> f64 {
        2.0 * self.f - self.f * self.f
    }

    /// Première excentricité
    pub fn e(&self) -> f64 {
        self.e2().sqrt()
    }

    /// Deuxième excentricité au carré
    pub fn ep2(&self) -> f64 {
        let e2 = self.e2();
        e2 / (1.0 - e2)
    }

    pub fn is_sphere(&self) -> bool {
        self.f == 0.0
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}
