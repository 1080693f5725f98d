//! Chemkin-style mechanism parsing.
//!
//! Only the `REACTIONS … END` block is read. Each reaction line ends in
//! `A b Ea` (mol, cm³, s, cal/mol) and may be followed by `LOW/ … /`,
//! `TROE/ … /`, `DUPLICATE` and third-body efficiency lines. Text after
//! `!` is a comment; keywords are case-insensitive.

use crate::error::{KineticsError, KineticsResult};
use crate::reaction::{Arrhenius, RateLaw, Reaction, ThirdBody, Troe};
use qf_fluids::Species;
use regex::Regex;
use std::path::Path;
use tracing::{debug, warn};

const MAX_LINE: usize = 1024;

/// Parsed reaction mechanism. Species indices of the reactions refer to
/// [`Mechanism::species`].
#[derive(Debug, Clone, PartialEq)]
pub struct Mechanism {
    species: Vec<Species>,
    reactions: Vec<Reaction>,
}

struct Patterns {
    reaction: Regex,
    keyword: Regex,
    efficiency: Regex,
    falloff: Regex,
    term: Regex,
}

impl Patterns {
    fn new() -> KineticsResult<Self> {
        Ok(Self {
            reaction: Regex::new(r"^(?P<eq>\S.*?)\s+(?P<a>[-+0-9.eEdD]+)\s+(?P<b>[-+0-9.eEdD]+)\s+(?P<ea>[-+0-9.eEdD]+)$")?,
            keyword: Regex::new(r"^(?i)(?P<key>LOW|TROE|REV)\s*/(?P<values>[^/]*)/")?,
            efficiency: Regex::new(r"(?P<sp>[A-Za-z][A-Za-z0-9()]*)\s*/\s*(?P<w>[-+0-9.eEdD]+)\s*/")?,
            falloff: Regex::new(r"\(\+(?P<m>[A-Za-z0-9]+)\)")?,
            term: Regex::new(r"^(?P<nu>[0-9]+(?:\.[0-9]*)?)?(?P<sp>.+)$")?,
        })
    }
}

/// Reaction under construction.
struct Pending {
    line: usize,
    equation: String,
    reactants: Vec<(usize, f64)>,
    products: Vec<(usize, f64)>,
    reversible: bool,
    high: (f64, f64, f64),
    third_body: bool,
    falloff: Option<Option<usize>>,
    low: Option<(f64, f64, f64)>,
    troe: Option<Troe>,
    efficiencies: Vec<(usize, f64)>,
}

fn parse_error(line: usize, message: impl Into<String>) -> KineticsError {
    KineticsError::Parse {
        line,
        message: message.into(),
    }
}

fn number(line: usize, s: &str) -> KineticsResult<f64> {
    s.replace(['d', 'D'], "e")
        .parse::<f64>()
        .map_err(|e| parse_error(line, format!("{s}: {e}")))
}

impl Mechanism {
    pub fn from_file(path: impl AsRef<Path>) -> KineticsResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| parse_error(0, format!("{}: {e}", path.as_ref().display())))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> KineticsResult<Self> {
        let pat = Patterns::new()?;
        let mut species = Vec::new();
        let mut pending: Vec<Pending> = Vec::new();
        let mut in_block = false;

        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            if raw.len() > MAX_LINE {
                return Err(parse_error(line_no, format!("line longer than {MAX_LINE} characters")));
            }
            let line = raw.split('!').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let upper = line.to_ascii_uppercase();
            let first = upper.split_whitespace().next().unwrap_or("");
            if !in_block {
                if first.starts_with("REAC") {
                    in_block = true;
                }
                continue;
            }
            if first == "END" {
                break;
            }

            if let Some(cap) = pat.reaction.captures(line).filter(|c| c["eq"].contains('=')) {
                let mut p = parse_equation(&pat, &cap["eq"], line_no, &mut species)?;
                p.high = (
                    number(line_no, &cap["a"])?,
                    number(line_no, &cap["b"])?,
                    number(line_no, &cap["ea"])?,
                );
                pending.push(p);
                continue;
            }

            let current = pending
                .last_mut()
                .ok_or_else(|| parse_error(line_no, "auxiliary line before the first reaction"))?;
            if first.starts_with("DUP") {
                // pairs are matched by equation when the block is finished
                continue;
            } else if let Some(cap) = pat.keyword.captures(line) {
                let values = cap["values"]
                    .split_whitespace()
                    .map(|s| number(line_no, s))
                    .collect::<KineticsResult<Vec<f64>>>()?;
                match cap["key"].to_ascii_uppercase().as_str() {
                    "LOW" => {
                        if values.len() != 3 {
                            return Err(parse_error(line_no, "LOW/ needs three values"));
                        }
                        current.low = Some((values[0], values[1], values[2]));
                    }
                    "TROE" => {
                        if !(3..=4).contains(&values.len()) {
                            return Err(parse_error(line_no, "TROE/ needs three or four values"));
                        }
                        current.troe = Some(Troe {
                            alpha: values[0],
                            t3: values[1],
                            t1: values[2],
                            t2: values.get(3).copied(),
                        });
                    }
                    _ => return Err(parse_error(line_no, "explicit reverse parameters are not supported")),
                }
            } else if line.contains('/') {
                for cap in pat.efficiency.captures_iter(line) {
                    let w = number(line_no, &cap["w"])?;
                    match cap["sp"].parse::<Species>() {
                        Ok(sp) => {
                            let k = species_index(&mut species, sp);
                            current.efficiencies.push((k, w));
                        }
                        Err(_) => warn!(line = line_no, species = &cap["sp"], "unknown collision partner ignored"),
                    }
                }
            } else {
                return Err(parse_error(line_no, format!("unrecognised line: {line}")));
            }
        }

        if !in_block {
            return Err(parse_error(0, "no REACTIONS block"));
        }
        let mut reactions = pending.into_iter().map(finish).collect::<KineticsResult<Vec<_>>>()?;
        merge_duplicates(&mut reactions)?;
        debug!(species = species.len(), reactions = reactions.len(), "mechanism parsed");
        Ok(Self { species, reactions })
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// All reactions, including entries deactivated by duplicate merging.
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn active(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions.iter().filter(|r| r.active)
    }

    pub fn index_of(&self, species: Species) -> Option<usize> {
        self.species.iter().position(|s| *s == species)
    }
}

fn species_index(species: &mut Vec<Species>, sp: Species) -> usize {
    match species.iter().position(|s| *s == sp) {
        Some(k) => k,
        None => {
            species.push(sp);
            species.len() - 1
        }
    }
}

fn parse_equation(pat: &Patterns, eq: &str, line: usize, species: &mut Vec<Species>) -> KineticsResult<Pending> {
    let compact: String = eq.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_ascii_uppercase();
    let (lhs, rhs, reversible) = if let Some((l, r)) = compact.split_once("<=>") {
        (l, r, true)
    } else if let Some((l, r)) = compact.split_once("=>") {
        (l, r, false)
    } else if let Some((l, r)) = compact.split_once('=') {
        (l, r, true)
    } else {
        return Err(parse_error(line, "reaction without '='"));
    };

    let mut falloff: Option<Option<usize>> = None;
    let mut strip = |side: &str| -> KineticsResult<String> {
        if let Some(cap) = pat.falloff.captures(side) {
            let partner = match &cap["m"] {
                "M" => None,
                other => Some(species_index(
                    species,
                    other
                        .parse::<Species>()
                        .map_err(|_| parse_error(line, format!("unknown collision partner {other}")))?,
                )),
            };
            if falloff.is_some_and(|f| f != partner) {
                return Err(parse_error(line, "fall-off partners differ between sides"));
            }
            falloff = Some(partner);
        }
        Ok(pat.falloff.replace_all(side, "").into_owned())
    };
    let lhs = strip(lhs)?;
    let rhs = strip(rhs)?;

    let mut third_body = false;
    let mut side = |text: &str| -> KineticsResult<Vec<(usize, f64)>> {
        let mut terms: Vec<(usize, f64)> = Vec::new();
        let mut has_m = false;
        for term in text.split('+').filter(|t| !t.is_empty()) {
            let cap = pat
                .term
                .captures(term)
                .ok_or_else(|| parse_error(line, format!("bad term {term}")))?;
            let nu = match cap.name("nu") {
                Some(m) => number(line, m.as_str())?,
                None => 1.0,
            };
            let name = &cap["sp"];
            if name == "M" {
                has_m = true;
                continue;
            }
            let sp = name
                .parse::<Species>()
                .map_err(|_| parse_error(line, format!("unknown species {name}")))?;
            let k = species_index(species, sp);
            match terms.iter_mut().find(|(i, _)| *i == k) {
                Some(entry) => entry.1 += nu,
                None => terms.push((k, nu)),
            }
        }
        if terms.is_empty() {
            return Err(parse_error(line, "empty reaction side"));
        }
        third_body |= has_m;
        Ok(terms)
    };
    let reactants = side(&lhs)?;
    let products = side(&rhs)?;
    if third_body && falloff.is_some() {
        return Err(parse_error(line, "both +M and (+M) on one reaction"));
    }

    Ok(Pending {
        line,
        equation: compact,
        reactants,
        products,
        reversible,
        high: (0.0, 0.0, 0.0),
        third_body,
        falloff,
        low: None,
        troe: None,
        efficiencies: Vec::new(),
    })
}

fn finish(p: Pending) -> KineticsResult<Reaction> {
    let order: f64 = p.reactants.iter().map(|(_, nu)| nu).sum();
    let third_body = match p.falloff {
        Some(Some(k)) if p.efficiencies.is_empty() => Some(ThirdBody::Species(k)),
        Some(_) => Some(ThirdBody::Mixture {
            efficiencies: p.efficiencies.clone(),
        }),
        None if p.third_body => Some(ThirdBody::Mixture {
            efficiencies: p.efficiencies.clone(),
        }),
        None => {
            if !p.efficiencies.is_empty() {
                return Err(parse_error(p.line, "efficiencies on a reaction without third body"));
            }
            None
        }
    };

    let (a, b, ea) = p.high;
    let rate = match (p.falloff.is_some(), p.low, p.troe) {
        (true, Some((la, lb, lea)), troe) => {
            let high = Arrhenius::from_chemkin(a, b, ea, order);
            let low = Arrhenius::from_chemkin(la, lb, lea, order + 1.0);
            match troe {
                Some(troe) => RateLaw::Troe { high, low, troe },
                None => RateLaw::Lindemann { high, low },
            }
        }
        (true, None, _) => return Err(parse_error(p.line, "fall-off reaction without LOW/")),
        (false, Some(_), _) => return Err(parse_error(p.line, "LOW/ on a reaction without (+M)")),
        (false, None, Some(_)) => return Err(parse_error(p.line, "TROE/ without LOW/")),
        (false, None, None) => {
            let order = if p.third_body { order + 1.0 } else { order };
            RateLaw::Arrhenius(Arrhenius::from_chemkin(a, b, ea, order))
        }
    };

    Ok(Reaction {
        equation: p.equation,
        line: p.line,
        reactants: p.reactants,
        products: p.products,
        rate,
        third_body,
        reversible: p.reversible,
        active: true,
    })
}

/// Fold each repeated equation into its first occurrence.
fn merge_duplicates(reactions: &mut [Reaction]) -> KineticsResult<()> {
    for j in 1..reactions.len() {
        let (head, tail) = reactions.split_at_mut(j);
        let second = &mut tail[0];
        let Some(first) = head
            .iter_mut()
            .find(|r| r.active && r.equation == second.equation)
        else {
            continue;
        };
        first.rate = match (first.rate, second.rate) {
            (RateLaw::Arrhenius(a), RateLaw::Arrhenius(b)) => RateLaw::Duplicate(a, b),
            _ => {
                return Err(parse_error(
                    second.line,
                    format!("cannot merge duplicate {}", second.equation),
                ));
            }
        };
        second.active = false;
    }
    Ok(())
}
