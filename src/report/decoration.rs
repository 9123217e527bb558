// Decorative status labels.
//
// The status shown next to each account in reports and exports is picked at
// render time from a fixed set. It is presentation only: nothing in this
// program verifies accounts, so the label carries no information about the
// account. Rendering the same result twice normally gives different labels.

use rand::Rng;

/// Labels used in the plain-text report.
pub const TEXT_STATUSES: &[&str] = &["ACTIVE", "EXPIRED", "INVALID", "BLOCKED", "VALID"];

/// Labels used in the HTML export, paired with their badge CSS class.
pub const HTML_STATUSES: &[(&str, &str)] = &[
    ("Active", "status-active"),
    ("Expired", "status-expired"),
    ("Invalid", "status-invalid"),
];

/// Values used for `status` in the JSON export.
pub const JSON_STATUSES: &[&str] = &["active", "expired", "blocked", "valid"];

/// Source of decorative choices. Implementations decide which of `len`
/// options to show; the result must be `< len`.
pub trait Decoration {
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniformly random choice, used by the interactive program.
#[derive(Debug, Default)]
pub struct RandomDecoration;

impl Decoration for RandomDecoration {
    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always the same option, for reproducible output.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedDecoration(pub usize);

impl Decoration for FixedDecoration {
    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            0
        } else {
            self.0 % len
        }
    }
}

pub(crate) fn choose<'a, T>(deco: &mut dyn Decoration, options: &'a [T]) -> &'a T {
    let idx = deco.pick(options.len()).min(options.len().saturating_sub(1));
    &options[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_picks_stay_in_range() {
        let mut deco = RandomDecoration;
        for _ in 0..200 {
            assert!(TEXT_STATUSES.contains(choose(&mut deco, TEXT_STATUSES)));
        }
    }

    #[test]
    fn fixed_picks_wrap_around() {
        let mut deco = FixedDecoration(6);
        assert_eq!(*choose(&mut deco, JSON_STATUSES), "blocked");
    }

    #[test]
    fn out_of_range_picks_are_clamped() {
        struct Broken;
        impl Decoration for Broken {
            fn pick(&mut self, _len: usize) -> usize {
                usize::MAX
            }
        }
        assert_eq!(*choose(&mut Broken, TEXT_STATUSES), "VALID");
    }
}
