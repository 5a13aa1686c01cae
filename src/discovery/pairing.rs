//! Repeat-to-case marker pairing
//!
//! A repeat marker binds only to the case marker directly after it. Only case
//! and repeat markers take part in the walk; other markers are transparent.

use crate::metadata::{MethodMarker, RepeatPolicy, Value};

/// A case marker with the repeat policy bound to it, if any
#[derive(Clone, Debug, PartialEq)]
pub struct CaseSpec {
    pub args: Vec<Value>,
    pub repeat: Option<RepeatPolicy>,
}

/// Outcome of pairing the markers of one method
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pairing {
    pub cases: Vec<CaseSpec>,
    pub warnings: Vec<String>,
}

/// Walk the markers of `method` with one marker of lookahead.
///
/// A repeat with nothing after it is dropped. Two repeats in succession are
/// both consumed with a single warning, so the case after them binds bare.
pub fn pair_markers(method: &str, markers: &[MethodMarker]) -> Pairing {
    let mut pairing = Pairing::default();
    let mut iter = markers
        .iter()
        .filter(|m| matches!(m, MethodMarker::Case(_) | MethodMarker::Repeat(_)))
        .peekable();

    while let Some(marker) = iter.next() {
        match marker {
            MethodMarker::Case(args) => pairing.cases.push(CaseSpec {
                args: args.clone(),
                repeat: None,
            }),
            MethodMarker::Repeat(policy) => match iter.next() {
                None => pairing.warnings.push(format!(
                    "The Repeat marker for the \"{method}\" method will be ignored \
                     because it does not have a case marker after it."
                )),
                Some(MethodMarker::Repeat(_)) => pairing.warnings.push(format!(
                    "The Repeat markers for the \"{method}\" method cannot occur in succession."
                )),
                Some(MethodMarker::Case(args)) => pairing.cases.push(CaseSpec {
                    args: args.clone(),
                    repeat: Some(policy.clone()),
                }),
                Some(_) => {}
            },
            _ => {}
        }
    }

    pairing
}
