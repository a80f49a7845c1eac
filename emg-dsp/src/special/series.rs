use super::{BesselSequence, Scaling, ENMTEN};

/// Two-term ascending series for `x < RTNSIG`.
pub(super) fn ascending_series(x: f64, nb: usize, scaling: Scaling) -> BesselSequence {
    let mut values = vec![0.0_f64; nb];
    let mut accurate = nb;

    let mut tempa = 1.0;
    let mut empal = 1.0;
    let halfx = if x > ENMTEN { 0.5 * x } else { 0.0 };
    if scaling == Scaling::Exponential {
        tempa *= (-x).exp();
    }
    let tempb = if x + 1.0 > 1.0 { halfx * halfx } else { 0.0 };
    values[0] = tempa + tempa * tempb / empal;
    if x != 0.0 && values[0] == 0.0 {
        accurate = 0;
    }

    if nb > 1 && x > 0.0 {
        // Terms falling below tover are flushed to zero.
        let tover = if tempb != 0.0 {
            ENMTEN / tempb
        } else {
            (ENMTEN + ENMTEN) / x
        };
        for k in 1..nb {
            tempa /= empal;
            empal += 1.0;
            tempa *= halfx;
            if tempa <= tover * empal {
                tempa = 0.0;
            }
            values[k] = tempa + tempa * tempb / empal;
            if values[k] == 0.0 && accurate > k + 1 {
                accurate = k;
            }
        }
    }

    BesselSequence { values, accurate }
}
