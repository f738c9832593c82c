// The fixed alphabet the tracer picks from.

use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Letter {
    pub upper: char,
    pub lower: char,
}

impl Letter {
    /// Upper and lower case side by side, the way the landscape layout shows them.
    pub fn pair_text(&self) -> String {
        format!("{}{}", self.upper, self.lower)
    }
}

pub const LETTERS: [Letter; 26] = alphabet();

const fn alphabet() -> [Letter; 26] {
    let mut out = [Letter { upper: 'A', lower: 'a' }; 26];
    let mut i = 0;
    while i < 26 {
        out[i] = Letter {
            upper: (b'A' + i as u8) as char,
            lower: (b'a' + i as u8) as char,
        };
        i += 1;
    }
    out
}

/// Uniform pick over the 26 letters.
pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Letter {
    LETTERS[rng.gen_range(0..LETTERS.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn table_covers_the_alphabet_in_order() {
        assert_eq!(LETTERS[0], Letter { upper: 'A', lower: 'a' });
        assert_eq!(LETTERS[25], Letter { upper: 'Z', lower: 'z' });
        for l in LETTERS {
            assert_eq!(l.upper.to_ascii_lowercase(), l.lower);
        }
    }

    #[test]
    fn picks_come_from_the_table() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            assert!(LETTERS.contains(&pick(&mut rng)));
        }
    }

    #[test]
    fn pair_text_has_no_separator() {
        assert_eq!(LETTERS[6].pair_text(), "Gg");
    }
}
