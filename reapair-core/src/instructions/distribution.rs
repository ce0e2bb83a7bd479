use std::cmp::min;

use super::pool::SentencePool;
use crate::error::ComposeError;

/// Requests up to this size only draw from the instructions list.
pub const SMALL_REQUEST_LIMIT: usize = 3;

/// One safety note per started five requested sentences (20 %).
pub const SAFETY_DIVISOR: usize = 5;

/// One conditional per started ten requested sentences (10 %).
pub const CONDITIONAL_DIVISOR: usize = 10;

/// Per-pool sentence counts for a single composition request.
///
/// `Distribution` holds the numeric policy only; sampling happens in the
/// composer.
///
/// # Invariants
/// - Every count is bounded by the size of its list
/// - `conditionals <= odd_slots(instructions)`
/// - `finals` is 1 on the proportional path and 0 on the small path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Distribution {
	pub safety: usize,
	pub instructions: usize,
	pub conditionals: usize,
	pub finals: usize,
}

impl Distribution {
	/// Computes the counts for `n` requested sentences.
	///
	/// # Behavior
	/// - `n <= 3`: only instructions, clamped to the list size.
	/// - Otherwise: `ceil(n / 5)` safety notes, `ceil(n / 10)` conditionals,
	///   one final, and the rest as instructions. Every count is clamped to
	///   its list.
	/// - Conditionals are capped to the odd slots of the spine. Budget freed
	///   by the cap goes back to the spine.
	///
	/// # Errors
	/// - `InvalidCount` if `n == 0`.
	/// - `InvalidPool` if the proportional path is taken and `finals` is empty.
	pub fn plan(pool: &SentencePool, n: usize) -> Result<Self, ComposeError> {
		if n == 0 {
			return Err(ComposeError::InvalidCount(n));
		}

		if Self::is_small(n) {
			return Ok(Self {
				instructions: min(n, pool.instructions().len()),
				..Self::default()
			});
		}

		if pool.finals().is_empty() {
			return Err(ComposeError::InvalidPool(
				"no final sentence available".to_owned(),
			));
		}

		let safety = min(n.div_ceil(SAFETY_DIVISOR), pool.safety_notes().len());
		let finals = 1;
		let spine_budget = |conditionals: usize| {
			min(
				n.saturating_sub(safety + conditionals + finals),
				pool.instructions().len(),
			)
		};

		let mut conditionals = min(n.div_ceil(CONDITIONAL_DIVISOR), pool.conditionals().len());
		let mut instructions = spine_budget(conditionals);

		let slots = odd_slots(instructions);
		if conditionals > slots {
			log::debug!(
				"capping conditionals from {} to {} available slots",
				conditionals, slots
			);
			conditionals = slots;
			// A longer spine only adds slots, so the cap still holds
			instructions = spine_budget(conditionals);
		}

		Ok(Self { safety, instructions, conditionals, finals })
	}

	/// Whether `n` takes the instructions-only path.
	pub fn is_small(n: usize) -> bool {
		n <= SMALL_REQUEST_LIMIT
	}

	/// Number of sentences the composition will contain.
	pub fn total(&self) -> usize {
		self.safety + self.instructions + self.conditionals + self.finals
	}
}

/// Number of odd positions `1, 3, 5, …` strictly below `spine_len`.
pub fn odd_slots(spine_len: usize) -> usize {
	spine_len / 2
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pool(safety: usize, instructions: usize, conditionals: usize, finals: usize) -> SentencePool {
		let make = |prefix: &str, count: usize| -> Vec<String> { (0..count).map(|i| format!("{prefix}{i}")).collect() };
		SentencePool::new(
			make("S", safety),
			make("I", instructions),
			make("C", conditionals),
			make("F", finals),
		)
		.unwrap()
	}

	#[test]
	fn zero_is_an_invalid_count() {
		assert!(matches!(Distribution::plan(&pool(5, 5, 5, 5), 0), Err(ComposeError::InvalidCount(0))));
	}

	#[test]
	fn small_requests_only_use_instructions() {
		for n in 1..=3 {
			let plan = Distribution::plan(&pool(5, 10, 5, 5), n).unwrap();
			assert_eq!(plan, Distribution { instructions: n, ..Distribution::default() });
		}
		assert_eq!(Distribution::plan(&pool(0, 2, 0, 0), 3).unwrap().instructions, 2);
	}

	#[test]
	fn small_requests_do_not_need_finals() {
		assert!(Distribution::plan(&pool(0, 3, 0, 0), 3).is_ok());
	}

	#[test]
	fn proportional_requests_need_a_final() {
		assert!(matches!(
			Distribution::plan(&pool(5, 10, 5, 0), 4),
			Err(ComposeError::InvalidPool(_))
		));
	}

	#[test]
	fn ratios_round_up() {
		let plan = Distribution::plan(&pool(50, 50, 50, 5), 10).unwrap();
		assert_eq!(plan, Distribution { safety: 2, instructions: 6, conditionals: 1, finals: 1 });

		let plan = Distribution::plan(&pool(50, 50, 50, 5), 30).unwrap();
		assert_eq!(plan, Distribution { safety: 6, instructions: 20, conditionals: 3, finals: 1 });

		let plan = Distribution::plan(&pool(50, 50, 50, 5), 11).unwrap();
		assert_eq!(plan, Distribution { safety: 3, instructions: 5, conditionals: 2, finals: 1 });
	}

	#[test]
	fn five_sentences_from_the_reference_pool() {
		let plan = Distribution::plan(&pool(1, 5, 1, 1), 5).unwrap();
		assert_eq!(plan, Distribution { safety: 1, instructions: 2, conditionals: 1, finals: 1 });
		assert_eq!(plan.total(), 5);
	}

	#[test]
	fn four_sentences_trade_the_conditional_for_an_instruction() {
		// A one-sentence spine has no odd slot
		let plan = Distribution::plan(&pool(10, 10, 10, 10), 4).unwrap();
		assert_eq!(plan, Distribution { safety: 1, instructions: 2, conditionals: 0, finals: 1 });
	}

	#[test]
	fn short_lists_under_fill() {
		let plan = Distribution::plan(&pool(0, 1, 3, 1), 20).unwrap();
		assert_eq!(plan.safety, 0);
		assert_eq!(plan.instructions, 1);
		assert_eq!(plan.conditionals, 0);
		assert_eq!(plan.total(), 2);
	}

	#[test]
	fn conditionals_never_exceed_slots() {
		let lists = pool(0, 3, 50, 1);
		for n in 4..40 {
			let plan = Distribution::plan(&lists, n).unwrap();
			assert!(plan.conditionals <= odd_slots(plan.instructions), "n = {n}: {plan:?}");
		}
	}

	#[test]
	fn odd_slot_counts() {
		assert_eq!(odd_slots(0), 0);
		assert_eq!(odd_slots(1), 0);
		assert_eq!(odd_slots(2), 1);
		assert_eq!(odd_slots(5), 2);
		assert_eq!(odd_slots(6), 3);
	}
}
