// Where the letter goes on a surface of a given size.
// Visual: landscape shows "Aa" side by side; portrait stacks "A" over "a".

use kurbo::{Point, Size};

use crate::letters::Letter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
}

/// One centered fillText call.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub center: Point,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GlyphLayout {
    pub orientation: Orientation,
    pub font_size: f64,
    pub runs: Vec<TextRun>,
}

impl GlyphLayout {
    pub fn for_surface(size: Size, letter: Letter) -> Self {
        if size.width > size.height {
            Self {
                orientation: Orientation::Landscape,
                font_size: (size.height * 0.6).round(),
                runs: vec![TextRun {
                    text: letter.pair_text(),
                    center: Point::new(size.width / 2.0, size.height / 2.0),
                }],
            }
        } else {
            let x = size.width / 2.0;
            Self {
                orientation: Orientation::Portrait,
                font_size: (size.height * 15.0 / 36.0).round(),
                runs: vec![
                    TextRun {
                        text: letter.upper.to_string(),
                        center: Point::new(x, size.height * 9.0 / 36.0),
                    },
                    TextRun {
                        text: letter.lower.to_string(),
                        center: Point::new(x, size.height * 23.0 / 36.0),
                    },
                ],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const B: Letter = Letter { upper: 'B', lower: 'b' };

    #[test]
    fn landscape_is_one_centered_run() {
        let layout = GlyphLayout::for_surface(Size::new(400.0, 300.0), B);
        assert_eq!(layout.orientation, Orientation::Landscape);
        assert_eq!(layout.font_size, 180.0);
        assert_eq!(layout.runs, vec![TextRun { text: "Bb".into(), center: Point::new(200.0, 150.0) }]);
    }

    #[test]
    fn portrait_stacks_upper_over_lower() {
        let layout = GlyphLayout::for_surface(Size::new(360.0, 720.0), B);
        assert_eq!(layout.orientation, Orientation::Portrait);
        assert_eq!(layout.font_size, 300.0);
        assert_eq!(layout.runs[0].center, Point::new(180.0, 180.0));
        assert_eq!(layout.runs[1].center, Point::new(180.0, 460.0));
        assert_eq!(layout.runs[0].text, "B");
        assert_eq!(layout.runs[1].text, "b");
    }

    #[test]
    fn square_surface_is_portrait() {
        let layout = GlyphLayout::for_surface(Size::new(500.0, 500.0), B);
        assert_eq!(layout.orientation, Orientation::Portrait);
    }
}
