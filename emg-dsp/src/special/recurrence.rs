use super::{BesselSequence, Scaling, CONST, ENMTEN, ENSIG, ENTEN, NSIG};

/// Bound on unnormalized values during backward recurrence. For large `x`
/// the ratio `I_0 / I_n` at the starting order exceeds `f64::MAX`.
const RESCALE: f64 = 1.0e250;

/// Divide the stored tail and the running sum by [`RESCALE`].
fn rescale(tail: &mut [f64], sum: &mut f64) {
    for v in tail {
        *v /= RESCALE;
    }
    *sum /= RESCALE;
}

/// State at the top of the backward recurrence.
struct Sweep {
    n: i64,
    en: f64,
    p: f64,
    ncalc: i64,
}

/// Forward sweep of Olver's P-sequence until it exceeds the significance
/// test, giving the order where backward recurrence starts.
fn forward_sweep(x: f64, nb: i64, magx: i64) -> Sweep {
    let nbmx = nb - magx;
    let mut n = magx + 1;
    let mut en = (2 * n) as f64;
    let mut plast = 1.0;
    let mut p = en / x;
    let mut ncalc = nb;

    let mut test = 2.0 * ENSIG;
    if 2 * magx > 5 * NSIG {
        test = (test * p).sqrt();
    } else {
        test /= CONST.powi(magx as i32);
    }

    if nbmx >= 3 {
        // Sweep up to order nb, rescaling if the sequence would overflow.
        let mut tover = ENTEN / ENSIG;
        let nend = nb - 1;
        for k in (magx + 2)..=nend {
            n = k;
            en += 2.0;
            let pold = plast;
            plast = p;
            p = en * plast / x + pold;
            if p > tover {
                tover = ENTEN;
                p /= tover;
                plast /= tover;
                let mut psave = p;
                let mut psavel = plast;
                let nstart = n + 1;
                let mut prev;
                loop {
                    n += 1;
                    en += 2.0;
                    prev = plast;
                    plast = p;
                    p = en * plast / x + prev;
                    if p > 1.0 {
                        break;
                    }
                }
                let tempb = en / x;
                let backward_test = prev * plast / ENSIG * (0.5 - 0.5 / (tempb * tempb));
                p = plast * tover;
                n -= 1;
                en -= 2.0;
                let nend = nb.min(n);

                // Highest order that still passes the backward test.
                ncalc = nend;
                for l in nstart..=nend {
                    let pold = psavel;
                    psavel = psave;
                    psave = en * psavel / x + pold;
                    if psave * psavel > backward_test {
                        ncalc = l - 1;
                        break;
                    }
                }
                return Sweep { n, en, p, ncalc };
            }
        }
        n = nend;
        en = (2 * n) as f64;
        test = test.max((plast * ENSIG).sqrt() * (p + p).sqrt());
    }

    loop {
        n += 1;
        en += 2.0;
        let pold = plast;
        plast = p;
        p = en * plast / x + pold;
        if p >= test {
            break;
        }
    }
    Sweep { n, en, p, ncalc }
}

/// Orders `0..nb` of `I_n(x)` for `x >= RTNSIG`.
pub(super) fn backward_recurrence(x: f64, nb: usize, scaling: Scaling) -> BesselSequence {
    let nb_i = nb as i64;
    let magx = x as i64;
    let Sweep {
        mut n,
        mut en,
        p,
        ncalc,
    } = forward_sweep(x, nb_i, magx);

    // One-based: b[k] holds order k - 1. Two trailing zeros seed the
    // recurrence when it starts below the top requested order.
    let mut b = vec![0.0_f64; nb + 3];

    n += 1;
    en += 2.0;
    let mut tempb = 0.0;
    let mut tempa = 1.0 / p;
    let mut em = (n - 1) as f64;
    let mut empal = em;
    let mut emp2al = em - 1.0;
    let mut sum = tempa * empal * emp2al / em;
    let nend = n - nb_i;

    let mut finished = false;
    if nend < 0 {
        b[n as usize] = tempa;
    } else {
        // Recur down to order nb - 1 without storing.
        for _ in 0..nend {
            n -= 1;
            en -= 2.0;
            let tempc = tempb;
            tempb = tempa;
            tempa = en * tempb / x + tempc;
            if tempa > RESCALE {
                tempa /= RESCALE;
                tempb /= RESCALE;
                sum /= RESCALE;
            }
            em -= 1.0;
            emp2al -= 1.0;
            if n == 1 {
                break;
            }
            if n == 2 {
                emp2al = 1.0;
            }
            empal -= 1.0;
            sum = (sum + tempa * empal) * emp2al / em;
        }
        b[n as usize] = tempa;

        if nb <= 1 {
            sum = sum + sum + tempa;
            finished = true;
        } else {
            n -= 1;
            en -= 2.0;
            let k = n as usize;
            b[k] = en * tempa / x + tempb;
            if b[k] > RESCALE {
                rescale(&mut b[k..], &mut sum);
            }
            if n == 1 {
                sum = sum + sum + b[1];
                finished = true;
            } else {
                em -= 1.0;
                emp2al -= 1.0;
                if n == 2 {
                    emp2al = 1.0;
                }
                empal -= 1.0;
                sum = (sum + b[k] * empal) * emp2al / em;
            }
        }
    }

    if !finished {
        for _ in 0..(n - 2).max(0) {
            n -= 1;
            en -= 2.0;
            let k = n as usize;
            b[k] = en * b[k + 1] / x + b[k + 2];
            if b[k] > RESCALE {
                rescale(&mut b[k..], &mut sum);
            }
            em -= 1.0;
            emp2al -= 1.0;
            if n == 2 {
                emp2al = 1.0;
            }
            empal -= 1.0;
            sum = (sum + b[k] * empal) * emp2al / em;
        }
        b[1] = 2.0 * empal * b[2] / x + b[3];
        sum = sum + sum + b[1];
    }

    if scaling == Scaling::Unscaled {
        sum *= (-x).exp();
    }
    let floor = if sum > 1.0 { ENMTEN * sum } else { ENMTEN };
    let values = b[1..=nb]
        .iter()
        .map(|&v| if v < floor { 0.0 } else { v / sum })
        .collect();

    BesselSequence {
        values,
        accurate: ncalc.max(0) as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sequence_satisfies_the_three_term_recurrence() {
        // I_{k-1}(x) - I_{k+1}(x) = (2k / x) I_k(x)
        let x = 7.5;
        let seq = backward_recurrence(x, 12, Scaling::Unscaled);
        assert_eq!(seq.accurate, 12);
        for k in 1..11 {
            let lhs = seq.values[k - 1] - seq.values[k + 1];
            let rhs = 2.0 * k as f64 / x * seq.values[k];
            assert_relative_eq!(lhs, rhs, max_relative = 1e-12);
        }
    }

    #[test]
    fn scaled_terms_sum_to_one() {
        // exp(-x) * (I_0 + 2 sum I_k) == 1 once enough orders are included.
        let x = 3.0;
        let seq = backward_recurrence(x, 40, Scaling::Exponential);
        let total = seq.values[0] + 2.0 * seq.values[1..].iter().sum::<f64>();
        assert_relative_eq!(total, 1.0, max_relative = 1e-14);
    }

    #[test]
    fn large_scaled_arguments_do_not_overflow() {
        // exp(-x) I_0(x) ~ (1 + 1/8x + 9/128x^2) / sqrt(2 pi x)
        for x in [1_500.0, 5_000.0, 10_000.0] {
            let seq = backward_recurrence(x, 1, Scaling::Exponential);
            let asymptotic = (1.0 + 1.0 / (8.0 * x) + 9.0 / (128.0 * x * x))
                / (2.0 * core::f64::consts::PI * x).sqrt();
            assert_relative_eq!(seq.values[0], asymptotic, max_relative = 1e-10);
        }
    }

    #[test]
    fn orders_far_above_the_argument_underflow_to_zero() {
        let seq = backward_recurrence(0.5, 400, Scaling::Unscaled);
        assert_eq!(seq.values.len(), 400);
        assert_eq!(seq.values[399], 0.0);
        assert!(seq.values[0] > 1.0);
    }
}
