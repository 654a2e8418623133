//! Geocentric ecliptic Moon from the periodic series of Meeus,
//! *Astronomical Algorithms* 2nd ed., chapter 47 (ELP-2000/82 truncated).
//!
//! Accuracy is about 10″ in longitude and 4″ in latitude, far tighter than the
//! one-degree bookkeeping the zodiac needs.

use core::f64::consts::PI;

const RAD: f64 = PI / 180.0;

/// Mean Earth–Moon distance the distance series is added to, km.
const MEAN_DISTANCE_KM: f64 = 385_000.56;

/// One row of the longitude/distance table: multiples of D, M, M′, F and the
/// sine (1e-6°) and cosine (1e-3 km) coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LrTerm {
    pub d: i8,
    pub m: i8,
    pub m_prime: i8,
    pub f: i8,
    pub sigma_l: i32,
    pub sigma_r: i32,
}

/// One row of the latitude table, coefficient in 1e-6°.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BTerm {
    pub d: i8,
    pub m: i8,
    pub m_prime: i8,
    pub f: i8,
    pub sigma_b: i32,
}

/// Geocentric ecliptic position of the Moon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipticPosition {
    /// Longitude in degrees, [0, 360)
    pub longitude_deg: f64,
    /// Latitude in degrees
    pub latitude_deg: f64,
    /// Earth centre → Moon centre, km
    pub distance_km: f64,
}

/// Loaded periodic series.
///
/// Building it is the "expensive" part the zodiac locator does once and shares.
#[derive(Debug, Clone, PartialEq)]
pub struct LunarSeries {
    longitude_distance: Vec<LrTerm>,
    latitude: Vec<BTerm>,
}

impl LunarSeries {
    /// The full 60 + 60 term tables.
    pub fn meeus() -> Self {
        Self::from_terms(TABLE_47A.to_vec(), TABLE_47B.to_vec())
    }

    pub fn from_terms(longitude_distance: Vec<LrTerm>, latitude: Vec<BTerm>) -> Self {
        Self {
            longitude_distance,
            latitude,
        }
    }

    /// Number of periodic terms across both tables.
    pub fn term_count(&self) -> usize {
        self.longitude_distance.len() + self.latitude.len()
    }

    /// Evaluate the series at a Julian Ephemeris Day.
    pub fn position(&self, jde: f64) -> EclipticPosition {
        let t = (jde - 2_451_545.0) / 36_525.0;
        let t2 = t * t;
        let t3 = t2 * t;
        let t4 = t3 * t;

        // ---------- fundamental arguments (degrees) ----------------------------
        let l_prime = 218.316_447_7 + 481_267.881_234_21 * t - 0.001_578_6 * t2 + t3 / 538_841.0
            - t4 / 65_194_000.0;
        let d = 297.850_192_1 + 445_267.111_403_4 * t - 0.001_881_9 * t2 + t3 / 545_868.0
            - t4 / 113_065_000.0;
        let m = 357.529_109_2 + 35_999.050_290_9 * t - 0.000_153_6 * t2 + t3 / 24_490_000.0;
        let m_prime = 134.963_396_4 + 477_198.867_505_5 * t + 0.008_741_4 * t2 + t3 / 69_699.0
            - t4 / 14_712_000.0;
        let f = 93.272_095_0 + 483_202.017_523_3 * t - 0.003_653_9 * t2 - t3 / 3_526_000.0
            + t4 / 863_310_000.0;

        let a1 = 119.75 + 131.849 * t;
        let a2 = 53.09 + 479_264.290 * t;
        let a3 = 313.45 + 481_266.484 * t;
        // eccentricity of Earth's orbit
        let e = 1.0 - 0.002_516 * t - 0.000_007_4 * t2;

        let (d, m, m_prime, f) = (d * RAD, m * RAD, m_prime * RAD, f * RAD);
        let argument = |cd: i8, cm: i8, cmp: i8, cf: i8| {
            cd as f64 * d + cm as f64 * m + cmp as f64 * m_prime + cf as f64 * f
        };
        let eccentricity = |cm: i8| match cm.abs() {
            0 => 1.0,
            1 => e,
            _ => e * e,
        };

        let (mut sum_l, mut sum_r) = (0.0, 0.0);
        for term in &self.longitude_distance {
            let arg = argument(term.d, term.m, term.m_prime, term.f);
            let scale = eccentricity(term.m);
            sum_l += term.sigma_l as f64 * scale * arg.sin();
            sum_r += term.sigma_r as f64 * scale * arg.cos();
        }

        let mut sum_b = 0.0;
        for term in &self.latitude {
            let arg = argument(term.d, term.m, term.m_prime, term.f);
            sum_b += term.sigma_b as f64 * eccentricity(term.m) * arg.sin();
        }

        // ---------- Venus, Jupiter and flattening corrections -----------------
        let l_rad = l_prime * RAD;
        sum_l += 3958.0 * (a1 * RAD).sin()
            + 1962.0 * (l_rad - f).sin()
            + 318.0 * (a2 * RAD).sin();
        sum_b += -2235.0 * l_rad.sin()
            + 382.0 * (a3 * RAD).sin()
            + 175.0 * (a1 * RAD - f).sin()
            + 175.0 * (a1 * RAD + f).sin()
            + 127.0 * (l_rad - m_prime).sin()
            - 115.0 * (l_rad + m_prime).sin();

        EclipticPosition {
            longitude_deg: (l_prime + sum_l / 1_000_000.0).rem_euclid(360.0),
            latitude_deg: sum_b / 1_000_000.0,
            distance_km: MEAN_DISTANCE_KM + sum_r / 1000.0,
        }
    }
}

const fn lr(d: i8, m: i8, m_prime: i8, f: i8, sigma_l: i32, sigma_r: i32) -> LrTerm {
    LrTerm {
        d,
        m,
        m_prime,
        f,
        sigma_l,
        sigma_r,
    }
}

const fn b(d: i8, m: i8, m_prime: i8, f: i8, sigma_b: i32) -> BTerm {
    BTerm {
        d,
        m,
        m_prime,
        f,
        sigma_b,
    }
}

#[rustfmt::skip]
static TABLE_47A: [LrTerm; 60] = [
    lr(0, 0, 1, 0, 6_288_774, -20_905_355),
    lr(2, 0, -1, 0, 1_274_027, -3_699_111),
    lr(2, 0, 0, 0, 658_314, -2_955_968),
    lr(0, 0, 2, 0, 213_618, -569_925),
    lr(0, 1, 0, 0, -185_116, 48_888),
    lr(0, 0, 0, 2, -114_332, -3_149),
    lr(2, 0, -2, 0, 58_793, 246_158),
    lr(2, -1, -1, 0, 57_066, -152_138),
    lr(2, 0, 1, 0, 53_322, -170_733),
    lr(2, -1, 0, 0, 45_758, -204_586),
    lr(0, 1, -1, 0, -40_923, -129_620),
    lr(1, 0, 0, 0, -34_720, 108_743),
    lr(0, 1, 1, 0, -30_383, 104_755),
    lr(2, 0, 0, -2, 15_327, 10_321),
    lr(0, 0, 1, 2, -12_528, 0),
    lr(0, 0, 1, -2, 10_980, 79_661),
    lr(4, 0, -1, 0, 10_675, -34_782),
    lr(0, 0, 3, 0, 10_034, -23_210),
    lr(4, 0, -2, 0, 8_548, -21_636),
    lr(2, 1, -1, 0, -7_888, 24_208),
    lr(2, 1, 0, 0, -6_766, 30_824),
    lr(1, 0, -1, 0, -5_163, -8_379),
    lr(1, 1, 0, 0, 4_987, -16_675),
    lr(2, -1, 1, 0, 4_036, -12_831),
    lr(2, 0, 2, 0, 3_994, -10_445),
    lr(4, 0, 0, 0, 3_861, -11_650),
    lr(2, 0, -3, 0, 3_665, 14_403),
    lr(0, 1, -2, 0, -2_689, -7_003),
    lr(2, 0, -1, 2, -2_602, 0),
    lr(2, -1, -2, 0, 2_390, 10_056),
    lr(1, 0, 1, 0, -2_348, 6_322),
    lr(2, -2, 0, 0, 2_236, -9_884),
    lr(0, 1, 2, 0, -2_120, 5_751),
    lr(0, 2, 0, 0, -2_069, 0),
    lr(2, -2, -1, 0, 2_048, -4_950),
    lr(2, 0, 1, -2, -1_773, 4_130),
    lr(2, 0, 0, 2, -1_595, 0),
    lr(4, -1, -1, 0, 1_215, -3_958),
    lr(0, 0, 2, 2, -1_110, 0),
    lr(3, 0, -1, 0, -892, 3_258),
    lr(2, 1, 1, 0, -810, 2_616),
    lr(4, -1, -2, 0, 759, -1_897),
    lr(0, 2, -1, 0, -713, -2_117),
    lr(2, 2, -1, 0, -700, 2_354),
    lr(2, 1, -2, 0, 691, 0),
    lr(2, -1, 0, -2, 596, 0),
    lr(4, 0, 1, 0, 549, -1_423),
    lr(0, 0, 4, 0, 537, -1_117),
    lr(4, -1, 0, 0, 520, -1_571),
    lr(1, 0, -2, 0, -487, -1_739),
    lr(2, 1, 0, -2, -399, 0),
    lr(0, 0, 2, -2, -381, -4_421),
    lr(1, 1, 1, 0, 351, 0),
    lr(3, 0, -2, 0, -340, 0),
    lr(4, 0, -3, 0, 330, 0),
    lr(2, -1, 2, 0, 327, 0),
    lr(0, 2, 1, 0, -323, 1_165),
    lr(1, 1, -1, 0, 299, 0),
    lr(2, 0, 3, 0, 294, 0),
    lr(2, 0, -1, -2, 0, 8_752),
];

#[rustfmt::skip]
static TABLE_47B: [BTerm; 60] = [
    b(0, 0, 0, 1, 5_128_122),
    b(0, 0, 1, 1, 280_602),
    b(0, 0, 1, -1, 277_693),
    b(2, 0, 0, -1, 173_237),
    b(2, 0, -1, 1, 55_413),
    b(2, 0, -1, -1, 46_271),
    b(2, 0, 0, 1, 32_573),
    b(0, 0, 2, 1, 17_198),
    b(2, 0, 1, -1, 9_266),
    b(0, 0, 2, -1, 8_822),
    b(2, -1, 0, -1, 8_216),
    b(2, 0, -2, -1, 4_324),
    b(2, 0, 1, 1, 4_200),
    b(2, 1, 0, -1, -3_359),
    b(2, -1, -1, 1, 2_463),
    b(2, -1, 0, 1, 2_211),
    b(2, -1, -1, -1, 2_065),
    b(0, 1, -1, -1, -1_870),
    b(4, 0, -1, -1, 1_828),
    b(0, 1, 0, 1, -1_794),
    b(0, 0, 0, 3, -1_749),
    b(0, 1, -1, 1, -1_565),
    b(1, 0, 0, 1, -1_491),
    b(0, 1, 1, 1, -1_475),
    b(0, 1, 1, -1, -1_410),
    b(0, 1, 0, -1, -1_344),
    b(1, 0, 0, -1, -1_335),
    b(0, 0, 3, 1, 1_107),
    b(4, 0, 0, -1, 1_021),
    b(4, 0, -1, 1, 833),
    b(0, 0, 1, -3, 777),
    b(4, 0, -2, 1, 671),
    b(2, 0, 0, -3, 607),
    b(2, 0, 2, -1, 596),
    b(2, -1, 1, -1, 491),
    b(2, 0, -2, 1, -451),
    b(0, 0, 3, -1, 439),
    b(2, 0, 2, 1, 422),
    b(2, 0, -3, -1, 421),
    b(2, 1, -1, 1, -366),
    b(2, 1, 0, 1, -351),
    b(4, 0, 0, 1, 331),
    b(2, -1, 1, 1, 315),
    b(2, -2, 0, -1, 302),
    b(0, 0, 1, 3, -283),
    b(2, 1, 1, -1, -229),
    b(1, 1, 0, -1, 223),
    b(1, 1, 0, 1, 223),
    b(0, 1, -2, -1, -220),
    b(2, 1, -1, -1, -220),
    b(1, 0, 1, 1, -185),
    b(2, -1, -2, -1, 181),
    b(0, 1, 2, 1, -177),
    b(4, 0, -2, -1, 176),
    b(4, -1, -1, -1, 166),
    b(1, 0, 1, -1, -164),
    b(4, 0, 1, -1, 132),
    b(1, 0, -1, -1, -119),
    b(4, -1, 0, -1, 115),
    b(2, -2, 0, 1, 107),
];
