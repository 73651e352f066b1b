use nom::{
    bytes::complete::{tag, take_till},
    character::complete::multispace0,
    combinator::{fail, map_parser},
    sequence::{preceded, terminated, tuple},
    IResult as _IResult,
};

use crate::types::SResult;

// https://github.com/getreu/parse-hyperlinks/blob/5af034d14aa72ffb9e705da13bf557a564b1bebf/parse-hyperlinks/src/lib.rs#L41
fn take_until_unbalanced(
    opening_bracket: char,
    closing_bracket: char,
) -> impl Fn(&str) -> _IResult<&str, &str> {
    move |i: &str| {
        let mut index = 0;
        let mut bracket_counter = 0;
        let mut ignore_bracket = false;
        while let Some(n) = &i[index..].find(&[opening_bracket, closing_bracket, '\\', '"'][..]) {
            index += n;
            let mut it = i[index..].chars();
            match it.next() {
                Some('\\') => {
                    index += '\\'.len_utf8();
                    if let Some(c) = it.next() {
                        index += c.len_utf8();
                    }
                }
                Some('"') => {
                    ignore_bracket = !ignore_bracket;
                    index += '"'.len_utf8();
                }
                Some(c) if c == opening_bracket => {
                    if !ignore_bracket {
                        bracket_counter += 1;
                    }
                    index += opening_bracket.len_utf8();
                }
                Some(c) if c == closing_bracket => {
                    if !ignore_bracket {
                        bracket_counter -= 1;
                    }
                    index += closing_bracket.len_utf8();
                }
                _ => unreachable!(),
            };
            if bracket_counter == -1 {
                index -= closing_bracket.len_utf8();
                return Ok((&i[index..], &i[0..index]));
            };
        }

        if bracket_counter == 0 {
            Ok(("", i))
        } else {
            Ok(fail(i)?)
        }
    }
}

/// This takes in a &str so remember to convert
// this is the same function in Qc module
pub fn between_braces<'a, T>(
    f: impl FnMut(&'a str) -> SResult<'a, T>,
) -> impl FnMut(&'a str) -> SResult<'a, T> {
    map_parser(
        preceded(
            tuple((multispace0, tag("{"), multispace0)),
            terminated(
                take_until_unbalanced('{', '}'),
                // tag("hello"),
                tuple((tag("}"), multispace0)),
            ),
        ),
        f,
    )
}

pub fn quoted_text(i: &str) -> SResult<&str> {
    terminated(preceded(tag("\""), take_till(|c| c == '\"')), tag("\""))(i)
}
