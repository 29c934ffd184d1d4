//! The shader-fix proof obligations.
//!
//! Four fix families, each verified by refutation:
//! 1. the division-by-zero guard (`clamp_low` floor),
//! 2. bounded parameter increments (four shader parameters plus an
//!    inductive invariant for the fixed GLOW instance),
//! 3. regex fallback defaults (empty values always replaced),
//! 4. glyph array bounds (mask and linearized pixel index).

use shaderproof_smt::solver::format_rational;
use shaderproof_smt::sorts::SmtSort;
use shaderproof_smt::terms::SmtTerm;

use crate::obligation::ProofObligation;

/// Exact rational constant, kept as numerator/denominator so claims stay
/// precise instead of going through floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub num: i64,
    pub den: i64,
}

impl Rational {
    pub const fn new(num: i64, den: i64) -> Self {
        Self { num, den }
    }

    pub fn add(self, other: Rational) -> Rational {
        Rational {
            num: self.num * other.den + other.num * self.den,
            den: self.den * other.den,
        }
    }

    pub fn term(self) -> SmtTerm {
        SmtTerm::real(self.num, self.den)
    }
}

impl std::fmt::Display for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_rational(self.num, self.den))
    }
}

/// The shipped clamp floor: `max(0.001, FONT_SCALE)`.
pub const CLAMP_FLOOR: Rational = Rational::new(1, 1000);

/// Bounds for one adjustable shader parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub initial: Rational,
    pub step: Rational,
    pub max: Rational,
    pub min: Rational,
}

/// The four adjustable parameters with their shipped bounds.
pub fn shader_params() -> [ParamSpec; 4] {
    [
        ParamSpec {
            name: "GLOW",
            initial: Rational::new(3, 2),
            step: Rational::new(1, 5),
            max: Rational::new(10, 1),
            min: Rational::new(1, 5),
        },
        ParamSpec {
            name: "SPEED",
            initial: Rational::new(1, 1),
            step: Rational::new(1, 10),
            max: Rational::new(5, 1),
            min: Rational::new(1, 10),
        },
        ParamSpec {
            name: "WIDTH",
            initial: Rational::new(8, 1),
            step: Rational::new(1, 2),
            max: Rational::new(20, 1),
            min: Rational::new(4, 1),
        },
        ParamSpec {
            name: "TRAIL",
            initial: Rational::new(8, 1),
            step: Rational::new(1, 2),
            max: Rational::new(20, 1),
            min: Rational::new(2, 1),
        },
    ]
}

/// The configuration keys filled in by the regex fallback loop.
pub const FALLBACK_KEYS: [&str; 12] = [
    "R", "G", "B", "Speed", "Glow", "Scale", "Width", "Trail", "Dens", "L1", "L2", "L3",
];

/// `clamp_low(x, floor)`: select `x` if `x >= floor`, else `floor`.
fn clamp_low(x: SmtTerm, floor: Rational) -> SmtTerm {
    SmtTerm::ite(x.clone().ge(floor.term()), x, floor.term())
}

/// Fix 1: the clamped font scale never drops below the floor, so the
/// division it guards cannot divide by zero.
pub fn clamp_floor(floor: Rational) -> ProofObligation {
    let result = clamp_low(SmtTerm::var("FONT_SCALE"), floor);
    ProofObligation {
        id: "clamp_floor".to_string(),
        title: "Division-by-zero guard".to_string(),
        spec_lines: vec![
            "Pre:  FONT_SCALE ∈ ℝ (any real number)".to_string(),
            format!("Post: clamp_low(FONT_SCALE, {floor}) >= {floor}"),
            "Safety: no division by zero possible".to_string(),
        ],
        goal: format!("∀ FONT_SCALE ∈ ℝ: clamp_low(FONT_SCALE, {floor}) >= {floor}"),
        vars: vec![("FONT_SCALE".to_string(), SmtSort::Real)],
        negation: vec![result.lt(floor.term())],
    }
}

/// Fix 1 companion: the clamped font scale is strictly positive, so it is
/// also safe as a multiplier. Only holds for a positive floor.
pub fn clamp_positive(floor: Rational) -> ProofObligation {
    let result = clamp_low(SmtTerm::var("FONT_SCALE"), floor);
    ProofObligation {
        id: "clamp_positive".to_string(),
        title: "Clamped scale strictly positive".to_string(),
        spec_lines: vec![
            "Pre:  FONT_SCALE ∈ ℝ (any real number)".to_string(),
            format!("Post: clamp_low(FONT_SCALE, {floor}) > 0"),
        ],
        goal: format!("∀ FONT_SCALE ∈ ℝ: clamp_low(FONT_SCALE, {floor}) > 0"),
        vars: vec![("FONT_SCALE".to_string(), SmtSort::Real)],
        negation: vec![result.le(SmtTerm::real(0, 1))],
    }
}

/// One bounded increment: `next = current + step` if `current < max`, else
/// `current`.
fn bounded_update(current: SmtTerm, step: Rational, max: Rational) -> SmtTerm {
    SmtTerm::ite(
        current.clone().lt(max.term()),
        current.clone().add(step.term()),
        current,
    )
}

/// Fix 2: from any in-range value, one increment overshoots `max` by at most
/// one step. The negation carries the tight case split: below `max` the next
/// value stays within `max + step`, at or above `max` the value is unchanged.
pub fn bounded_step(param: ParamSpec) -> ProofObligation {
    let ParamSpec {
        name,
        initial,
        step,
        max,
        min,
    } = param;
    let current = SmtTerm::var("current");
    let next = bounded_update(current.clone(), step, max);
    let cap = max.add(step);

    let violation = SmtTerm::or(vec![
        SmtTerm::and(vec![
            current.clone().lt(max.term()),
            next.clone().gt(cap.term()),
        ]),
        SmtTerm::and(vec![current.clone().ge(max.term()), next.gt(max.term())]),
    ]);

    ProofObligation {
        id: format!("bound_{}", name.to_ascii_lowercase()),
        title: format!("Bounded increment: {name}"),
        spec_lines: vec![
            format!("Initial: {initial}, Step: {step}, Max: {max}, Min: {min}"),
            format!("Pre:  {min} <= current <= {max}"),
            format!("Post: next <= {cap} (one-step overshoot at most)"),
        ],
        goal: format!("∀ current ∈ [{min}, {max}]: one increment keeps {name} <= {cap}"),
        vars: vec![("current".to_string(), SmtSort::Real)],
        negation: vec![
            current.clone().ge(min.term()),
            current.le(max.term()),
            violation,
        ],
    }
}

/// Fix 2, inductive form for the fixed GLOW instance (max 10.0, step 0.2):
/// the interval [0.2, 10.2] is stable under repeated increments, so the bound
/// holds after any number of updates.
pub fn bounded_step_inductive() -> ProofObligation {
    let min = Rational::new(1, 5);
    let step = Rational::new(1, 5);
    let max = Rational::new(10, 1);
    let hi = max.add(step);

    let val = SmtTerm::var("val");
    let next = bounded_update(val.clone(), step, max);

    ProofObligation {
        id: "bound_inductive".to_string(),
        title: "Inductive bound invariant".to_string(),
        spec_lines: vec![
            format!("Invariant: val ∈ [{min}, {hi}]"),
            format!("Step: one increment with step {step} toward max {max}"),
            "Post: the invariant is preserved".to_string(),
        ],
        goal: format!("val ∈ [{min}, {hi}] is stable under the bounded increment"),
        vars: vec![("val".to_string(), SmtSort::Real)],
        negation: vec![
            val.clone().ge(min.term()),
            val.le(hi.term()),
            next.gt(hi.term()),
        ],
    }
}

/// Fix 3: modeling "empty" as a per-key flag, a key is empty after the
/// fallback loop only if it was empty before *and* the default is empty.
/// Defaults are never empty, so the result never is.
pub fn fallback_single() -> ProofObligation {
    let before = SmtTerm::var("s_before_empty");
    let default_empty = SmtTerm::var("defaults_empty");
    let after = SmtTerm::and(vec![before, default_empty.clone()]);

    ProofObligation {
        id: "fallback_single".to_string(),
        title: "Regex fallback defaults".to_string(),
        spec_lines: vec![
            "Pre:  s[key] ∈ {empty, non-empty}, defaults[key] = non-empty".to_string(),
            "Post: s[key] = non-empty after the fallback loop".to_string(),
        ],
        goal: "∀ key: defaults[key] ≠ empty → s[key] ≠ empty after the loop".to_string(),
        vars: vec![
            ("s_before_empty".to_string(), SmtSort::Bool),
            ("defaults_empty".to_string(), SmtSort::Bool),
        ],
        negation: vec![default_empty.eq(SmtTerm::bool(false)), after],
    }
}

/// Fix 3 over the enumerated key set: no key of the twelve can remain empty.
/// The negation asks for *some* key that is still empty after the loop.
pub fn fallback_all_keys() -> ProofObligation {
    let mut vars = Vec::with_capacity(FALLBACK_KEYS.len());
    let mut still_empty = Vec::with_capacity(FALLBACK_KEYS.len());
    for key in FALLBACK_KEYS {
        let name = format!("s_{key}_before_empty");
        still_empty.push(SmtTerm::and(vec![
            SmtTerm::var(name.clone()),
            SmtTerm::bool(false),
        ]));
        vars.push((name, SmtSort::Bool));
    }

    ProofObligation {
        id: "fallback_all_keys".to_string(),
        title: format!("Fallback over all {} keys", FALLBACK_KEYS.len()),
        spec_lines: vec![
            format!("Keys: {}", FALLBACK_KEYS.join(", ")),
            "Post: every key is non-empty after the fallback loop".to_string(),
        ],
        goal: "no key in the enumerated set remains empty after the loop".to_string(),
        vars,
        negation: vec![SmtTerm::or(still_empty)],
    }
}

/// Fix 4: for any 32-bit glyph index, masking with 15 yields a value in
/// [0, 15], so the GLYPHS[16] access is in bounds.
pub fn glyph_mask() -> ProofObligation {
    let masked = SmtTerm::var("glyph_idx").bv_and(SmtTerm::bv(15, 32));

    ProofObligation {
        id: "glyph_mask".to_string(),
        title: "Glyph array bounds".to_string(),
        spec_lines: vec![
            "Pre:  glyph_idx ∈ int32 (any value from random)".to_string(),
            "Post: (glyph_idx & 15) ∈ [0, 15]".to_string(),
            "Safety: no out-of-bounds access to GLYPHS[16]".to_string(),
        ],
        goal: "∀ idx ∈ int32: (idx & 15) <= 15".to_string(),
        vars: vec![("glyph_idx".to_string(), SmtSort::BitVec(32))],
        negation: vec![masked.bv_ugt(SmtTerm::bv(15, 32))],
    }
}

/// Fix 4 companion: with pixel coordinates clamped to the 5x7 glyph grid,
/// the linearized bit index `py*5 + px` fits the 35-bit glyph.
pub fn glyph_linear_index() -> ProofObligation {
    let px = SmtTerm::var("px");
    let py = SmtTerm::var("py");
    let bit_idx = py.clone().bv_mul(SmtTerm::bv(5, 32)).bv_add(px.clone());

    ProofObligation {
        id: "glyph_linear_index".to_string(),
        title: "Glyph bit index bounds".to_string(),
        spec_lines: vec![
            "Pre:  px ∈ [0, 4], py ∈ [0, 6] (clamped pixel coordinates)".to_string(),
            "Post: py*5 + px ∈ [0, 34] (fits the 35-bit glyph)".to_string(),
        ],
        goal: "∀ px ∈ [0,4], py ∈ [0,6]: py*5 + px <= 34".to_string(),
        vars: vec![
            ("px".to_string(), SmtSort::BitVec(32)),
            ("py".to_string(), SmtSort::BitVec(32)),
        ],
        negation: vec![
            px.bv_ule(SmtTerm::bv(4, 32)),
            py.bv_ule(SmtTerm::bv(6, 32)),
            bit_idx.bv_ugt(SmtTerm::bv(34, 32)),
        ],
    }
}

/// The full shader-fix suite, in report order.
pub fn shader_fix_suite() -> Vec<ProofObligation> {
    let mut suite = vec![clamp_floor(CLAMP_FLOOR), clamp_positive(CLAMP_FLOOR)];
    for param in shader_params() {
        suite.push(bounded_step(param));
    }
    suite.push(bounded_step_inductive());
    suite.push(fallback_single());
    suite.push(fallback_all_keys());
    suite.push(glyph_mask());
    suite.push(glyph_linear_index());
    suite
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rational_display_matches_shipped_constants() {
        assert_eq!(CLAMP_FLOOR.to_string(), "0.001");
        assert_eq!(Rational::new(3, 2).to_string(), "1.5");
        assert_eq!(Rational::new(10, 1).add(Rational::new(1, 5)).to_string(), "10.2");
    }

    #[test]
    fn suite_has_eleven_obligations_in_report_order() {
        let suite = shader_fix_suite();
        let ids: Vec<&str> = suite.iter().map(|ob| ob.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "clamp_floor",
                "clamp_positive",
                "bound_glow",
                "bound_speed",
                "bound_width",
                "bound_trail",
                "bound_inductive",
                "fallback_single",
                "fallback_all_keys",
                "glyph_mask",
                "glyph_linear_index",
            ]
        );
    }

    #[test]
    fn clamp_obligations_declare_one_fresh_real() {
        for ob in [clamp_floor(CLAMP_FLOOR), clamp_positive(CLAMP_FLOOR)] {
            assert_eq!(ob.vars, vec![("FONT_SCALE".to_string(), SmtSort::Real)]);
            assert_eq!(ob.negation.len(), 1);
        }
    }

    #[test]
    fn bounded_step_preconditions_come_before_violation() {
        let ob = bounded_step(shader_params()[0]);
        assert_eq!(ob.id, "bound_glow");
        assert_eq!(ob.negation.len(), 3);
        // Precondition: current >= min
        assert_eq!(
            ob.negation[0],
            SmtTerm::var("current").ge(SmtTerm::real(1, 5))
        );
    }

    #[test]
    fn fallback_all_keys_declares_one_flag_per_key() {
        let ob = fallback_all_keys();
        assert_eq!(ob.vars.len(), FALLBACK_KEYS.len());
        assert!(ob
            .vars
            .iter()
            .all(|(_, sort)| *sort == SmtSort::Bool));
        assert_eq!(ob.negation.len(), 1);
    }

    #[test]
    fn glyph_obligations_use_32_bit_vectors() {
        let mask = glyph_mask();
        assert_eq!(mask.vars, vec![("glyph_idx".to_string(), SmtSort::BitVec(32))]);

        let linear = glyph_linear_index();
        assert_eq!(linear.vars.len(), 2);
        assert!(linear
            .vars
            .iter()
            .all(|(_, sort)| *sort == SmtSort::BitVec(32)));
    }
}
