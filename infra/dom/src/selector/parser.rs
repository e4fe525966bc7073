use super::{AttrOp, Combinator, Complex, Compound, Simple};
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_until, take_while, take_while1};
use nom::character::complete::{char, multispace0, multispace1};
use nom::combinator::{all_consuming, map, opt, recognize, value};
use nom::error::{Error, ErrorKind};
use nom::multi::{many0, separated_list1};
use nom::sequence::{delimited, pair, preceded, tuple};

pub(super) fn selector_list(input: &str) -> Option<Vec<Complex>> {
    all_consuming(separated_list1(tuple((multispace0, char(','), multispace0)), complex))(input)
        .ok()
        .map(|(_, list)| list)
}

fn complex(input: &str) -> IResult<&str, Complex> {
    let (mut rest, first) = compound(input)?;
    let mut compounds = vec![first];
    let mut combinators = Vec::new();

    loop {
        match pair(combinator, compound)(rest) {
            Ok((next, (joined_by, part))) => {
                combinators.push(joined_by);
                compounds.push(part);
                rest = next;
            },
            Err(nom::Err::Error(_)) => break,
            Err(err) => return Err(err),
        }
    }

    Ok((rest, Complex { compounds, combinators }))
}

fn combinator(input: &str) -> IResult<&str, Combinator> {
    alt((
        value(Combinator::Child, delimited(multispace0, char('>'), multispace0)),
        value(Combinator::Descendant, multispace1),
    ))(input)
}

fn compound(input: &str) -> IResult<&str, Compound> {
    let (rest, name) = opt(alt((map(char('*'), |_| None), map(ident, Some))))(input)?;
    let (rest, parts) = many0(simple)(rest)?;

    if name.is_none() && parts.is_empty() {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
    }
    Ok((rest, Compound { tag: name.flatten().map(str::to_ascii_lowercase), simple: parts }))
}

fn simple(input: &str) -> IResult<&str, Simple> {
    alt((
        map(preceded(char('#'), ident), |id| Simple::Id(id.to_owned())),
        map(preceded(char('.'), ident), |class| Simple::Class(class.to_owned())),
        attribute,
    ))(input)
}

fn attribute(input: &str) -> IResult<&str, Simple> {
    map(
        delimited(
            pair(char('['), multispace0),
            pair(ident, opt(pair(preceded(multispace0, operator), preceded(multispace0, attribute_value)))),
            pair(multispace0, char(']')),
        ),
        |(name, test)| Simple::Attribute {
            name: name.to_ascii_lowercase(),
            test: test.map(|(op, expected)| (op, expected.to_owned())),
        },
    )(input)
}

fn operator(input: &str) -> IResult<&str, AttrOp> {
    alt((
        value(AttrOp::Includes, tag("~=")),
        value(AttrOp::Prefix, tag("^=")),
        value(AttrOp::Suffix, tag("$=")),
        value(AttrOp::Substring, tag("*=")),
        value(AttrOp::Equals, tag("=")),
    ))(input)
}

fn attribute_value(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_until("\""), char('"')),
        delimited(char('\''), take_until("'"), char('\'')),
        ident,
    ))(input)
}

fn ident(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()),
    ))(input)
}
