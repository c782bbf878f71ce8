//! Builds a small discrimination net and a sequence matcher over a handful of patterns, then runs a
//! few subject expressions through both to show what each indexer reports.

use dnet::{new_net, new_sequence_matcher, Expression, Kind, MatchMode, Net};
use dnet_abs::log::set_global_logging_threshold;

fn main() {
  set_global_logging_threshold(1);

  let sym = Kind::root("Sym");

  let mut net: Net<Kind, Expression<Kind>> = new_net();
  // f(a, b)
  net.add_pattern(Expression::operation(sym.clone(), vec![Expression::symbol("a", sym.clone()), Expression::symbol("b", sym.clone())]))
    .expect("f(a, b) is a well-formed pattern");
  // f(___, g(a))
  net
    .add_pattern(Expression::operation(
      sym.clone(),
      vec![Expression::wildcard(0, false), Expression::operation(sym.clone(), vec![Expression::symbol("a", sym.clone())])],
    ))
    .expect("f(___, g(a)) is a well-formed pattern");

  for subject in [
    Expression::operation(sym.clone(), vec![Expression::symbol("a", sym.clone()), Expression::symbol("b", sym.clone())]),
    Expression::operation(
      sym.clone(),
      vec![
        Expression::operation(sym.clone(), vec![Expression::symbol("x", sym.clone())]),
        Expression::operation(sym.clone(), vec![Expression::symbol("a", sym.clone())]),
      ],
    ),
    Expression::operation(sym.clone(), vec![Expression::symbol("a", sym.clone()), Expression::symbol("c", sym.clone())]),
  ] {
    let hits = net.match_(&subject, MatchMode::Collect).expect("subjects here contain no pattern-only tokens");
    println!("{subject} matches {} pattern(s)", hits.len());
    for hit in &hits {
      println!("  - {hit}");
    }
  }

  // A sequence matcher over h(___x, mid, ___y): find where the literal "mid" sits inside a variadic h(...).
  let sequence_pattern = Expression::operation(
    sym.clone(),
    vec![
      Expression::variable("x", Expression::wildcard(0, false)),
      Expression::symbol("mid", sym.clone()),
      Expression::variable("y", Expression::wildcard(0, false)),
    ],
  );
  let matcher = new_sequence_matcher(vec![sequence_pattern]).expect("the pattern has bracketing sequence wildcards");

  let subject = Expression::operation(
    sym.clone(),
    vec![Expression::symbol("p", sym.clone()), Expression::symbol("q", sym.clone()), Expression::symbol("mid", sym.clone()), Expression::symbol("r", sym.clone())],
  );
  for (substitution, pattern) in matcher.match_(&subject) {
    println!("{subject} matches {pattern} with {substitution}");
  }
}
