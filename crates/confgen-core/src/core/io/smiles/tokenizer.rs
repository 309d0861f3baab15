use super::error::SmilesError;
use crate::core::models::element::Element;
use crate::core::models::stereo::Handedness;
use crate::core::models::topology::BondOrder;

/// Directional single bond marker: `/` is `Up` and `\` is `Down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Atom(AtomToken),
    Bond {
        order: BondOrder,
        direction: Option<BondDirection>,
        pos: usize,
    },
    RingClosure { digit: u16, pos: usize },
    OpenParen(usize),
    CloseParen(usize),
    Dot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomToken {
    pub element: Element,
    pub is_aromatic: bool,
    pub isotope: Option<u16>,
    pub hydrogens: Option<u8>,
    pub charge: i8,
    pub chirality: Option<Handedness>,
    pub is_bracket: bool,
    pub pos: usize,
}

impl AtomToken {
    fn bare(element: Element, is_aromatic: bool, pos: usize) -> Self {
        Self {
            element,
            is_aromatic,
            isotope: None,
            hydrogens: None,
            charge: 0,
            chirality: None,
            is_bracket: false,
            pos,
        }
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, SmilesError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '[' => {
                let (token, next) = parse_bracket_atom(&chars, i)?;
                tokens.push(Token::Atom(token));
                i = next;
            }
            'B' | 'C' => {
                let two = match (ch, chars.get(i + 1)) {
                    ('B', Some('r')) => Some(Element::Br),
                    ('C', Some('l')) => Some(Element::Cl),
                    _ => None,
                };
                if let Some(element) = two {
                    tokens.push(Token::Atom(AtomToken::bare(element, false, i)));
                    i += 2;
                } else {
                    let element = if ch == 'B' { Element::B } else { Element::C };
                    tokens.push(Token::Atom(AtomToken::bare(element, false, i)));
                    i += 1;
                }
            }
            'N' | 'O' | 'P' | 'S' | 'F' | 'I' => {
                let element = organic_element(ch).ok_or(SmilesError::UnexpectedChar { pos: i, ch })?;
                tokens.push(Token::Atom(AtomToken::bare(element, false, i)));
                i += 1;
            }
            'b' | 'c' | 'n' | 'o' | 'p' | 's' => {
                let element = organic_element(ch.to_ascii_uppercase())
                    .ok_or(SmilesError::UnexpectedChar { pos: i, ch })?;
                tokens.push(Token::Atom(AtomToken::bare(element, true, i)));
                i += 1;
            }
            '-' | '/' | '\\' | '=' | '#' | ':' => {
                let (order, direction) = match ch {
                    '/' => (BondOrder::Single, Some(BondDirection::Up)),
                    '\\' => (BondOrder::Single, Some(BondDirection::Down)),
                    '=' => (BondOrder::Double, None),
                    '#' => (BondOrder::Triple, None),
                    ':' => (BondOrder::Aromatic, None),
                    _ => (BondOrder::Single, None),
                };
                tokens.push(Token::Bond {
                    order,
                    direction,
                    pos: i,
                });
                i += 1;
            }
            '0'..='9' => {
                tokens.push(Token::RingClosure {
                    digit: ch as u16 - '0' as u16,
                    pos: i,
                });
                i += 1;
            }
            '%' => {
                let tens = chars.get(i + 1).and_then(|c| c.to_digit(10));
                let ones = chars.get(i + 2).and_then(|c| c.to_digit(10));
                match (tens, ones) {
                    (Some(t), Some(o)) => {
                        tokens.push(Token::RingClosure {
                            digit: (t * 10 + o) as u16,
                            pos: i,
                        });
                        i += 3;
                    }
                    _ if i + 2 >= chars.len() => return Err(SmilesError::UnexpectedEnd),
                    _ => return Err(SmilesError::InvalidNumber { pos: i }),
                }
            }
            '(' => {
                tokens.push(Token::OpenParen(i));
                i += 1;
            }
            ')' => {
                tokens.push(Token::CloseParen(i));
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot(i));
                i += 1;
            }
            _ => return Err(SmilesError::UnexpectedChar { pos: i, ch }),
        }
    }

    Ok(tokens)
}

fn organic_element(ch: char) -> Option<Element> {
    match ch {
        'B' => Some(Element::B),
        'C' => Some(Element::C),
        'N' => Some(Element::N),
        'O' => Some(Element::O),
        'P' => Some(Element::P),
        'S' => Some(Element::S),
        'F' => Some(Element::F),
        'I' => Some(Element::I),
        _ => None,
    }
}

fn parse_bracket_atom(chars: &[char], start: usize) -> Result<(AtomToken, usize), SmilesError> {
    let close = chars[start..]
        .iter()
        .position(|&c| c == ']')
        .map(|offset| start + offset)
        .ok_or(SmilesError::UnclosedBracket { pos: start })?;
    let mut i = start + 1;

    let isotope = match read_number(chars, &mut i, close) {
        Some(value) => Some(u16::try_from(value).map_err(|_| SmilesError::InvalidNumber { pos: start + 1 })?),
        None => None,
    };

    let (element, is_aromatic) = read_bracket_symbol(chars, &mut i, close)?;

    let chirality = read_chirality(chars, &mut i, close);

    let mut hydrogens = Some(0);
    if i < close && chars[i] == 'H' {
        i += 1;
        let count = read_number(chars, &mut i, close).unwrap_or(1);
        hydrogens = Some(u8::try_from(count).map_err(|_| SmilesError::InvalidNumber { pos: i })?);
    }

    let mut charge: i32 = 0;
    if i < close && (chars[i] == '+' || chars[i] == '-') {
        let sign_pos = i;
        let sign = if chars[i] == '+' { 1 } else { -1 };
        i += 1;
        if let Some(magnitude) = read_number(chars, &mut i, close) {
            charge = sign * magnitude as i32;
        } else {
            charge = sign;
            while i < close && chars[i] == chars[sign_pos] {
                charge += sign;
                i += 1;
            }
        }
        if !(-15..=15).contains(&charge) {
            return Err(SmilesError::InvalidCharge { pos: sign_pos });
        }
    }

    if i < close && chars[i] == ':' {
        i += 1;
        if read_number(chars, &mut i, close).is_none() {
            return Err(SmilesError::InvalidNumber { pos: i });
        }
    }

    if i != close {
        return Err(SmilesError::UnexpectedChar { pos: i, ch: chars[i] });
    }

    Ok((
        AtomToken {
            element,
            is_aromatic,
            isotope,
            hydrogens,
            charge: charge as i8,
            chirality,
            is_bracket: true,
            pos: start,
        },
        close + 1,
    ))
}

/// Reads `@`, `@@`, `@TH1` or `@TH2`. Other chirality classes (`@SP`, `@TB`, `@OH`) are
/// consumed without producing a handedness.
fn read_chirality(chars: &[char], i: &mut usize, close: usize) -> Option<Handedness> {
    if *i >= close || chars[*i] != '@' {
        return None;
    }
    *i += 1;
    if *i < close && chars[*i] == '@' {
        *i += 1;
        return Some(Handedness::Clockwise);
    }
    let class: String = chars[*i..close].iter().take(2).collect();
    if !matches!(class.as_str(), "TH" | "AL" | "SP" | "TB" | "OH") {
        return Some(Handedness::Anticlockwise);
    }
    *i += 2;
    match (class.as_str(), read_number(chars, i, close)) {
        ("TH", Some(1)) => Some(Handedness::Anticlockwise),
        ("TH", Some(2)) => Some(Handedness::Clockwise),
        _ => None,
    }
}

fn read_bracket_symbol(
    chars: &[char],
    i: &mut usize,
    close: usize,
) -> Result<(Element, bool), SmilesError> {
    let pos = *i;
    let first = *chars.get(pos).filter(|_| pos < close).ok_or(SmilesError::UnexpectedEnd)?;

    if first.is_ascii_lowercase() {
        // Aromatic symbols: two-letter forms first.
        if pos + 1 < close {
            let pair: String = [first, chars[pos + 1]].iter().collect();
            if pair == "se" || pair == "as" {
                let element = Element::from_symbol(&capitalize(&pair)).ok_or(SmilesError::InvalidElement { pos, text: pair.clone() })?;
                *i += 2;
                return Ok((element, true));
            }
        }
        let element = organic_element(first.to_ascii_uppercase())
            .filter(|e| matches!(e, Element::B | Element::C | Element::N | Element::O | Element::P | Element::S))
            .ok_or_else(|| SmilesError::InvalidElement { pos, text: first.to_string() })?;
        *i += 1;
        return Ok((element, true));
    }

    if !first.is_ascii_uppercase() {
        return Err(SmilesError::InvalidElement { pos, text: first.to_string() });
    }

    if pos + 1 < close && chars[pos + 1].is_ascii_lowercase() {
        let pair: String = [first, chars[pos + 1]].iter().collect();
        if let Some(element) = Element::from_symbol(&pair) {
            *i += 2;
            return Ok((element, false));
        }
    }
    let single = first.to_string();
    let element = Element::from_symbol(&single).ok_or(SmilesError::InvalidElement { pos, text: single })?;
    *i += 1;
    Ok((element, false))
}

fn read_number(chars: &[char], i: &mut usize, limit: usize) -> Option<u32> {
    let start = *i;
    let mut value: u32 = 0;
    while *i < limit && chars[*i].is_ascii_digit() {
        value = value.saturating_mul(10).saturating_add(chars[*i].to_digit(10)?);
        *i += 1;
    }
    (*i > start).then_some(value)
}

fn capitalize(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + c.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(token: &Token) -> &AtomToken {
        match token {
            Token::Atom(a) => a,
            other => panic!("expected atom token, got {:?}", other),
        }
    }

    #[test]
    fn two_letter_organic_halogens_are_recognized() {
        let tokens = tokenize("ClCBr").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(atom(&tokens[0]).element, Element::Cl);
        assert_eq!(atom(&tokens[1]).element, Element::C);
        assert_eq!(atom(&tokens[2]).element, Element::Br);
    }

    #[test]
    fn bracket_atom_parses_isotope_hydrogens_and_charge() {
        let tokens = tokenize("[13CH3+]").unwrap();
        let a = atom(&tokens[0]);
        assert_eq!(a.element, Element::C);
        assert_eq!(a.isotope, Some(13));
        assert_eq!(a.hydrogens, Some(3));
        assert_eq!(a.charge, 1);
        assert!(a.is_bracket);
    }

    #[test]
    fn bracket_atom_without_hydrogens_has_zero_count() {
        let tokens = tokenize("[O-]").unwrap();
        let a = atom(&tokens[0]);
        assert_eq!(a.hydrogens, Some(0));
        assert_eq!(a.charge, -1);
    }

    #[test]
    fn repeated_charge_signs_accumulate() {
        let tokens = tokenize("[Fe++]").unwrap();
        assert_eq!(atom(&tokens[0]).charge, 2);
        let tokens = tokenize("[S-2]").unwrap();
        assert_eq!(atom(&tokens[0]).charge, -2);
    }

    #[test]
    fn chirality_markers_set_handedness() {
        let tokens = tokenize("[C@@H](F)(Cl)Br").unwrap();
        let a = atom(&tokens[0]);
        assert_eq!(a.element, Element::C);
        assert_eq!(a.hydrogens, Some(1));
        assert_eq!(a.chirality, Some(Handedness::Clockwise));

        let tokens = tokenize("[C@H]").unwrap();
        assert_eq!(atom(&tokens[0]).chirality, Some(Handedness::Anticlockwise));
        let tokens = tokenize("[C@TH2H]").unwrap();
        assert_eq!(atom(&tokens[0]).chirality, Some(Handedness::Clockwise));
        let tokens = tokenize("[Co@OH12]").unwrap();
        assert_eq!(atom(&tokens[0]).chirality, None);
        assert_eq!(atom(&tokens[0]).element, Element::Co);
    }

    #[test]
    fn slashes_are_directional_single_bonds() {
        let tokens = tokenize("F/C=C\\F").unwrap();
        assert_eq!(
            tokens[1],
            Token::Bond {
                order: BondOrder::Single,
                direction: Some(BondDirection::Up),
                pos: 1
            }
        );
        assert!(matches!(
            tokens[5],
            Token::Bond {
                direction: Some(BondDirection::Down),
                ..
            }
        ));
        assert!(matches!(
            tokens[3],
            Token::Bond {
                order: BondOrder::Double,
                direction: None,
                ..
            }
        ));
    }

    #[test]
    fn aromatic_bracket_symbols_are_marked_aromatic() {
        let tokens = tokenize("[nH]").unwrap();
        let a = atom(&tokens[0]);
        assert_eq!(a.element, Element::N);
        assert!(a.is_aromatic);
        assert_eq!(a.hydrogens, Some(1));
        let tokens = tokenize("[se]").unwrap();
        assert_eq!(atom(&tokens[0]).element, Element::Se);
    }

    #[test]
    fn two_digit_ring_closures_are_tokenized() {
        let tokens = tokenize("C%12CC%12").unwrap();
        assert!(matches!(tokens[1], Token::RingClosure { digit: 12, .. }));
        assert!(matches!(tokens[4], Token::RingClosure { digit: 12, .. }));
    }

    #[test]
    fn unclosed_bracket_is_an_error() {
        assert_eq!(
            tokenize("C[NH4+"),
            Err(SmilesError::UnclosedBracket { pos: 1 })
        );
    }

    #[test]
    fn unknown_characters_are_rejected_with_position() {
        assert_eq!(
            tokenize("CC?"),
            Err(SmilesError::UnexpectedChar { pos: 2, ch: '?' })
        );
        assert!(matches!(
            tokenize("[Xx]"),
            Err(SmilesError::InvalidElement { pos: 1, .. })
        ));
    }
}
