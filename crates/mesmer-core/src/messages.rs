//! Kid-friendly feedback messages.

use rand::seq::SliceRandom;
use rand::Rng;

pub const CORRECT: &[&str] = &["ጽቡቕ ስራሕ! 🌟", "ሰናይ! ⭐", "ምሉእ! 🎉", "ከምዚ ቀጽል/ሊ! 🏆", "ደስ ዝብል!"];

pub const INCORRECT: &[&str] = &["ደጊምካ ፈትን! 💪", "ኣጆኻ! 🚀", "ትኽእል ኢኻ! 💫", "ቀሪብካ! 🌟"];

pub const ENCOURAGEMENT: &[&str] = &["ኣዝዩ ዘሐብን!", "ቀጽሎ!", "ከኾብ! ⭐", "ጽቡቅ ኣሳልጦ!"];

pub const MATCH_FOUND: &str = "Great match! 🌟";
pub const TRY_AGAIN: &str = "Try again! 💪";

/// A random entry from `table`, or `""` for an empty table.
pub fn pick<'a, R: Rng + ?Sized>(table: &[&'a str], rng: &mut R) -> &'a str {
    table.choose(rng).copied().unwrap_or("")
}

/// Feedback line for an answer.
pub fn feedback<R: Rng + ?Sized>(correct: bool, rng: &mut R) -> &'static str {
    pick(if correct { CORRECT } else { INCORRECT }, rng)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn feedback_comes_from_matching_table() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert!(CORRECT.contains(&feedback(true, &mut rng)));
            assert!(INCORRECT.contains(&feedback(false, &mut rng)));
        }
    }

    #[test]
    fn empty_table_yields_empty_string() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick(&[], &mut rng), "");
    }
}
