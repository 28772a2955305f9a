//! Transfer functions of the Setun element set.
//!
//! Each function is a pure mapping from input trits to output trits.
//! Elements in [`crate::circuit`] read their ports, call one of these and
//! write the result back. The tables follow the hardware cells, which is
//! why several of them differ from textbook balanced-ternary arithmetic
//! (the half adder in particular does not wrap).

use crate::ternary::Trit;

/// Magnetic amplifier: passes a signed control signal only while powered.
#[inline]
pub const fn magnetic_amplifier(power: Trit, control: Trit) -> Trit {
    match (power, control) {
        (Trit::P, Trit::P) => Trit::P,
        (Trit::P, Trit::N) => Trit::N,
        _ => Trit::O,
    }
}

/// Ternary logic cell: the first input wins unless the second matches it.
#[inline]
pub const fn ternary_cell(a: Trit, b: Trit) -> Trit {
    match (a, b) {
        (Trit::P, Trit::N | Trit::O) => Trit::P,
        (Trit::N, Trit::O | Trit::P) => Trit::N,
        _ => Trit::O,
    }
}

/// Shift register cell: load `data` while `enable` is positive, else hold.
#[inline]
pub const fn shift_register(data: Trit, enable: Trit, held: Trit) -> Trit {
    if enable.is_positive() {
        data
    } else {
        held
    }
}

/// Ternary trigger next state. Priority: reset > set+ > set- > hold.
#[inline]
pub const fn trigger(set_pos: Trit, set_neg: Trit, reset: Trit, state: Trit) -> Trit {
    if reset.is_positive() {
        Trit::O
    } else if set_pos.is_positive() {
        Trit::P
    } else if set_neg.is_positive() {
        Trit::N
    } else {
        state
    }
}

/// Half adder, returning (sum, carry).
///
/// Opposite signs cancel; equal non-zero signs produce a zero sum and a
/// carry of that sign.
#[inline]
pub const fn half_adder(a: Trit, b: Trit) -> (Trit, Trit) {
    match (a, b) {
        (Trit::O, other) | (other, Trit::O) => (other, Trit::O),
        (Trit::P, Trit::P) => (Trit::O, Trit::P),
        (Trit::N, Trit::N) => (Trit::O, Trit::N),
        _ => (Trit::O, Trit::O),
    }
}

/// Ternary adder over (a, b, carry_in), returning (sum, carry_out).
///
/// The integer sum is bucketed rather than reduced modulo 3.
#[inline]
pub const fn full_adder(a: Trit, b: Trit, carry_in: Trit) -> (Trit, Trit) {
    let total = a.to_i8() + b.to_i8() + carry_in.to_i8();
    match total {
        t if t >= 2 => (Trit::P, Trit::P),
        1 => (Trit::P, Trit::O),
        0 => (Trit::O, Trit::O),
        -1 => (Trit::N, Trit::O),
        _ => (Trit::N, Trit::N),
    }
}

/// Largest decoder select width accepted from scheme files (729 lines).
pub const MAX_DECODER_SELECT: usize = 6;

/// Decoder line index: inputs read as base-3 digits, most significant first.
pub fn decoder_index(inputs: impl IntoIterator<Item = Trit>) -> usize {
    inputs
        .into_iter()
        .fold(0usize, |acc, t| acc.saturating_mul(3).saturating_add(t.digit()))
}

/// Number of decoder output lines for `inputs` select lines.
///
/// Saturates at `usize::MAX` for widths that do not fit.
#[inline]
pub const fn decoder_width(inputs: usize) -> usize {
    if inputs > u32::MAX as usize {
        return usize::MAX;
    }
    match 3usize.checked_pow(inputs as u32) {
        Some(width) => width,
        None => usize::MAX,
    }
}

/// Counter next count for one step.
///
/// Increment takes precedence over decrement; both wrap within `[0, max]`.
#[inline]
pub const fn counter_next(increment: Trit, decrement: Trit, count: u32, max: u32) -> u32 {
    if increment.is_positive() {
        if count < max { count + 1 } else { 0 }
    } else if decrement.is_positive() {
        if count > 0 { count - 1 } else { max }
    } else {
        count
    }
}

/// Counter output level: above half of `max` is POS, below is NEG.
///
/// Compared as `2 * count` against `max` so odd ranges have no zero level.
#[inline]
pub const fn counter_level(count: u32, max: u32) -> Trit {
    let doubled = count as u64 * 2;
    let max = max as u64;
    if doubled > max {
        Trit::P
    } else if doubled < max {
        Trit::N
    } else {
        Trit::O
    }
}

/// Binary-style AND: POS only when both inputs are POS.
#[inline]
pub const fn and(a: Trit, b: Trit) -> Trit {
    if a.is_positive() && b.is_positive() {
        Trit::P
    } else {
        Trit::O
    }
}

/// Binary-style OR: POS when either input is POS.
#[inline]
pub const fn or(a: Trit, b: Trit) -> Trit {
    if a.is_positive() || b.is_positive() {
        Trit::P
    } else {
        Trit::O
    }
}

/// Inhibit: passes `a` only while the inhibit line is ZERO.
#[inline]
pub const fn inhibit(a: Trit, inhibit: Trit) -> Trit {
    if inhibit.is_zero() {
        a
    } else {
        Trit::O
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Trit::{N, O, P};

    #[test]
    fn test_half_adder_table() {
        let table = [
            ((O, O), (O, O)),
            ((O, P), (P, O)),
            ((O, N), (N, O)),
            ((P, O), (P, O)),
            ((P, P), (O, P)),
            ((P, N), (O, O)),
            ((N, O), (N, O)),
            ((N, P), (O, O)),
            ((N, N), (O, N)),
        ];
        for ((a, b), expected) in table {
            assert_eq!(half_adder(a, b), expected, "half_adder({:?}, {:?})", a, b);
        }
    }

    #[test]
    fn test_full_adder_buckets() {
        for a in Trit::ALL {
            for b in Trit::ALL {
                for c in Trit::ALL {
                    let s = a.to_i8() + b.to_i8() + c.to_i8();
                    let expected = match s {
                        2 | 3 => (P, P),
                        1 => (P, O),
                        0 => (O, O),
                        -1 => (N, O),
                        _ => (N, N),
                    };
                    assert_eq!(full_adder(a, b, c), expected, "sum {}", s);
                }
            }
        }
    }

    #[test]
    fn test_magnetic_amplifier() {
        assert_eq!(magnetic_amplifier(P, P), P);
        assert_eq!(magnetic_amplifier(P, N), N);
        assert_eq!(magnetic_amplifier(P, O), O);
        for control in Trit::ALL {
            assert_eq!(magnetic_amplifier(O, control), O);
            assert_eq!(magnetic_amplifier(N, control), O);
        }
    }

    #[test]
    fn test_ternary_cell() {
        assert_eq!(ternary_cell(P, O), P);
        assert_eq!(ternary_cell(P, N), P);
        assert_eq!(ternary_cell(P, P), O);
        assert_eq!(ternary_cell(N, O), N);
        assert_eq!(ternary_cell(N, P), N);
        assert_eq!(ternary_cell(N, N), O);
        for b in Trit::ALL {
            assert_eq!(ternary_cell(O, b), O);
        }
    }

    #[test]
    fn test_trigger_priority() {
        // reset wins over both set lines
        assert_eq!(trigger(P, P, P, N), O);
        assert_eq!(trigger(P, P, O, O), P);
        assert_eq!(trigger(O, P, O, O), N);
        for s in Trit::ALL {
            assert_eq!(trigger(O, O, O, s), s);
            assert_eq!(trigger(N, N, N, s), s);
        }
    }

    #[test]
    fn test_decoder_index() {
        assert_eq!(decoder_index(std::iter::empty()), 0);
        assert_eq!(decoder_index([N, N]), 0);
        assert_eq!(decoder_index([O, P]), 5);
        assert_eq!(decoder_index([P, P]), 8);
        assert_eq!(decoder_width(2), 9);
        assert_eq!(decoder_width(MAX_DECODER_SELECT), 729);
    }

    #[test]
    fn test_decoder_width_saturates() {
        assert_eq!(decoder_width(41), usize::MAX);
        assert_eq!(decoder_width(usize::MAX), usize::MAX);
    }

    #[test]
    fn test_counter_wraps() {
        assert_eq!(counter_next(P, O, 2, 2), 0);
        assert_eq!(counter_next(O, P, 0, 2), 2);
        assert_eq!(counter_next(P, P, 1, 2), 2);
        assert_eq!(counter_next(O, O, 1, 2), 1);
    }

    #[test]
    fn test_counter_level() {
        assert_eq!(counter_level(0, 2), N);
        assert_eq!(counter_level(1, 2), O);
        assert_eq!(counter_level(2, 2), P);
        assert_eq!(counter_level(1, 3), N);
        assert_eq!(counter_level(2, 3), P);
    }

    #[test]
    fn test_binary_gates_ignore_neg() {
        assert_eq!(and(P, P), P);
        assert_eq!(and(N, N), O);
        assert_eq!(or(N, P), P);
        assert_eq!(or(N, N), O);
        assert_eq!(inhibit(N, O), N);
        assert_eq!(inhibit(P, N), O);
        assert_eq!(inhibit(P, P), O);
    }

    #[test]
    fn test_shift_register_holds() {
        assert_eq!(shift_register(N, P, P), N);
        assert_eq!(shift_register(N, O, P), P);
        assert_eq!(shift_register(N, N, O), O);
    }
}
