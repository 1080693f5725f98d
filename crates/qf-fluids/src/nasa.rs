//! NASA 7-coefficient thermodynamic polynomials (GRI-Mech 3.0 fits).

use crate::species::Species;

/// Two-range NASA polynomial. Coefficients are `a1..a7` for `cp/R`, `h/RT`
/// and `s/R`; the low range applies below `t_mid`.
#[derive(Debug, Clone, PartialEq)]
pub struct Nasa7 {
    pub t_mid: f64,
    pub low: [f64; 7],
    pub high: [f64; 7],
}

impl Nasa7 {
    #[inline]
    fn coeffs(&self, t: f64) -> &[f64; 7] {
        if t < self.t_mid { &self.low } else { &self.high }
    }

    /// Dimensionless heat capacity `cp/R`.
    pub fn cp_r(&self, t: f64) -> f64 {
        let a = self.coeffs(t);
        a[0] + t * (a[1] + t * (a[2] + t * (a[3] + t * a[4])))
    }

    /// Temperature derivative of `cp/R` [1/K].
    pub fn dcp_r_dt(&self, t: f64) -> f64 {
        let a = self.coeffs(t);
        a[1] + t * (2.0 * a[2] + t * (3.0 * a[3] + t * 4.0 * a[4]))
    }

    /// Dimensionless enthalpy `h/(RT)` including the heat of formation.
    pub fn h_rt(&self, t: f64) -> f64 {
        let a = self.coeffs(t);
        a[0] + t * (a[1] / 2.0 + t * (a[2] / 3.0 + t * (a[3] / 4.0 + t * a[4] / 5.0))) + a[5] / t
    }

    /// Dimensionless standard-state entropy `s°/R`.
    pub fn s_r(&self, t: f64) -> f64 {
        let a = self.coeffs(t);
        a[0] * t.ln() + t * (a[1] + t * (a[2] / 2.0 + t * (a[3] / 3.0 + t * a[4] / 4.0))) + a[6]
    }

    /// Dimensionless standard-state Gibbs energy `g°/(RT)`.
    pub fn g_rt(&self, t: f64) -> f64 {
        self.h_rt(t) - self.s_r(t)
    }
}

static H2: Nasa7 = Nasa7 {
    t_mid: 1000.0,
    low: [
        2.344_331_12, 7.980_520_75e-3, -1.947_815_10e-5, 2.015_720_94e-8, -7.376_117_61e-12,
        -9.179_351_73e2, 6.830_102_38e-1,
    ],
    high: [
        3.337_279_20, -4.940_247_31e-5, 4.994_567_78e-7, -1.795_663_94e-10, 2.002_553_76e-14,
        -9.501_589_22e2, -3.205_023_31,
    ],
};

static O2: Nasa7 = Nasa7 {
    t_mid: 1000.0,
    low: [
        3.782_456_36, -2.996_734_16e-3, 9.847_302_01e-6, -9.681_295_09e-9, 3.243_728_37e-12,
        -1.063_943_56e3, 3.657_675_73,
    ],
    high: [
        3.282_537_84, 1.483_087_54e-3, -7.579_666_69e-7, 2.094_705_55e-10, -2.167_177_94e-14,
        -1.088_457_72e3, 5.453_231_29,
    ],
};

static H2O: Nasa7 = Nasa7 {
    t_mid: 1000.0,
    low: [
        4.198_640_56, -2.036_434_10e-3, 6.520_402_11e-6, -5.487_970_62e-9, 1.771_978_17e-12,
        -3.029_372_67e4, -8.490_322_08e-1,
    ],
    high: [
        3.033_992_49, 2.176_918_04e-3, -1.640_725_18e-7, -9.704_198_70e-11, 1.682_009_92e-14,
        -3.000_429_71e4, 4.966_770_10,
    ],
};

static OH: Nasa7 = Nasa7 {
    t_mid: 1000.0,
    low: [
        3.992_015_43, -2.401_317_52e-3, 4.617_938_41e-6, -3.881_133_33e-9, 1.364_114_70e-12,
        3.615_080_56e3, -1.039_254_58e-1,
    ],
    high: [
        3.092_887_67, 5.484_297_16e-4, 1.265_052_28e-7, -8.794_615_56e-11, 1.174_123_76e-14,
        3.858_657_00e3, 4.476_696_10,
    ],
};

static H: Nasa7 = Nasa7 {
    t_mid: 1000.0,
    low: [
        2.5, 7.053_328_19e-13, -1.995_919_64e-15, 2.300_816_32e-18, -9.277_323_32e-22,
        2.547_365_99e4, -4.466_828_53e-1,
    ],
    high: [
        2.500_000_01, -2.308_429_73e-11, 1.615_619_48e-14, -4.735_152_35e-18, 4.981_973_57e-22,
        2.547_365_99e4, -4.466_829_14e-1,
    ],
};

static O: Nasa7 = Nasa7 {
    t_mid: 1000.0,
    low: [
        3.168_267_10, -3.279_318_84e-3, 6.643_063_96e-6, -6.128_066_24e-9, 2.112_659_71e-12,
        2.912_225_92e4, 2.051_933_46,
    ],
    high: [
        2.569_420_78, -8.597_411_37e-5, 4.194_845_89e-8, -1.001_777_99e-11, 1.228_336_91e-15,
        2.921_757_91e4, 4.784_338_64,
    ],
};

static HO2: Nasa7 = Nasa7 {
    t_mid: 1000.0,
    low: [
        4.301_798_01, -4.749_120_51e-3, 2.115_828_91e-5, -2.427_638_94e-8, 9.292_251_24e-12,
        2.948_080_40e2, 3.716_662_45,
    ],
    high: [
        4.017_210_90, 2.239_820_13e-3, -6.336_581_50e-7, 1.142_463_70e-10, -1.079_085_35e-14,
        1.118_567_13e2, 3.785_102_15,
    ],
};

static H2O2: Nasa7 = Nasa7 {
    t_mid: 1000.0,
    low: [
        4.276_112_69, -5.428_224_17e-4, 1.673_357_01e-5, -2.157_708_13e-8, 8.624_543_63e-12,
        -1.770_258_21e4, 3.435_050_74,
    ],
    high: [
        4.165_002_85, 4.908_316_94e-3, -1.901_392_25e-6, 3.711_859_86e-10, -2.879_083_05e-14,
        -1.786_178_77e4, 2.916_156_62,
    ],
};

static N2: Nasa7 = Nasa7 {
    t_mid: 1000.0,
    low: [
        3.298_677, 1.408_240_4e-3, -3.963_222e-6, 5.641_515e-9, -2.444_854e-12, -1.020_899_9e3,
        3.950_372,
    ],
    high: [
        2.926_64, 1.487_976_8e-3, -5.684_76e-7, 1.009_703_8e-10, -6.753_351e-15, -9.227_977e2,
        5.980_528,
    ],
};

static AR: Nasa7 = Nasa7 {
    t_mid: 1000.0,
    low: [2.5, 0.0, 0.0, 0.0, 0.0, -745.375, 4.366],
    high: [2.5, 0.0, 0.0, 0.0, 0.0, -745.375, 4.366],
};

static CH4: Nasa7 = Nasa7 {
    t_mid: 1000.0,
    low: [
        5.149_876_13, -1.367_097_88e-2, 4.918_005_99e-5, -4.847_430_26e-8, 1.666_939_56e-11,
        -1.024_664_76e4, -4.641_303_76,
    ],
    high: [
        7.485_149_50e-2, 1.339_094_67e-2, -5.732_858_09e-6, 1.222_925_35e-9, -1.018_152_30e-13,
        -9.468_344_59e3, 1.843_731_80e1,
    ],
};

static CO: Nasa7 = Nasa7 {
    t_mid: 1000.0,
    low: [
        3.579_533_47, -6.103_536_80e-4, 1.016_814_33e-6, 9.070_058_84e-10, -9.044_244_99e-13,
        -1.434_408_60e4, 3.508_409_28,
    ],
    high: [
        2.715_185_61, 2.062_527_43e-3, -9.988_257_71e-7, 2.300_530_08e-10, -2.036_477_16e-14,
        -1.415_187_24e4, 7.818_687_72,
    ],
};

static CO2: Nasa7 = Nasa7 {
    t_mid: 1000.0,
    low: [
        2.356_773_52, 8.984_596_77e-3, -7.123_562_69e-6, 2.459_190_22e-9, -1.436_995_48e-13,
        -4.837_196_97e4, 9.901_052_22,
    ],
    high: [
        3.857_460_29, 4.414_370_26e-3, -2.214_814_04e-6, 5.234_901_88e-10, -4.720_841_64e-14,
        -4.875_916_60e4, 2.271_638_06,
    ],
};

pub(crate) fn table(species: Species) -> &'static Nasa7 {
    match species {
        Species::H2 => &H2,
        Species::O2 => &O2,
        Species::H2O => &H2O,
        Species::OH => &OH,
        Species::H => &H,
        Species::O => &O,
        Species::HO2 => &HO2,
        Species::H2O2 => &H2O2,
        Species::N2 => &N2,
        Species::Ar => &AR,
        Species::CH4 => &CH4,
        Species::CO => &CO,
        Species::CO2 => &CO2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_join_continuously() {
        for sp in Species::ALL {
            let n = sp.nasa7();
            let below = n.t_mid - 1e-9;
            let above = n.t_mid;
            assert!((n.cp_r(below) - n.cp_r(above)).abs() < 2e-3, "{sp:?} cp");
            assert!((n.h_rt(below) - n.h_rt(above)).abs() < 2e-3, "{sp:?} h");
            assert!((n.s_r(below) - n.s_r(above)).abs() < 2e-3, "{sp:?} s");
        }
    }

    #[test]
    fn diatomic_cp_near_seven_halves_at_room_temperature() {
        for sp in [Species::N2, Species::O2, Species::H2] {
            let cp = sp.nasa7().cp_r(300.0);
            assert!((cp - 3.5).abs() < 0.1, "{sp:?} cp/R = {cp}");
        }
        assert_eq!(Species::Ar.nasa7().cp_r(800.0), 2.5);
    }

    #[test]
    fn formation_enthalpy_of_water() {
        // ΔH_f(H2O, 298.15 K) ≈ -241.8 kJ/mol
        let t = 298.15;
        let h = Species::H2O.nasa7().h_rt(t) * 8.314_462_618 * t;
        assert!((h + 241_826.0).abs() < 300.0, "h = {h}");
    }

    #[test]
    fn cp_derivative_matches_difference_quotient() {
        let n = Species::CH4.nasa7();
        let t = 600.0;
        let fd = (n.cp_r(t + 1e-3) - n.cp_r(t - 1e-3)) / 2e-3;
        assert!((fd - n.dcp_r_dt(t)).abs() < 1e-6);
    }
}
