use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use super::distribution::{Distribution, odd_slots};
use super::pool::SentencePool;
use crate::error::ComposeError;

/// Composes a sequence of repair instructions from `pool`.
///
/// # Parameters
/// - `pool`: the four sentence lists, read only.
/// - `n`: requested number of sentences (`>= 1`).
/// - `rng`: randomness source; pass a seeded generator for reproducible output.
///
/// # Returns
/// `[safety notes…] + [instructions interleaved with conditionals] + [one final]`,
/// or `min(n, |instructions|)` instructions alone when `n <= 3`.
///
/// # Behavior
/// - Counts come from [`Distribution::plan`].
/// - Every list is sampled without replacement, in random order.
/// - Conditionals go into distinct odd slots of the spine (see [`interleave`]).
/// - The result may be shorter than `n` when lists are short; it never
///   repeats an entry and is never padded.
///
/// # Errors
/// - `InvalidCount` if `n == 0`.
/// - `InvalidPool` if `n > 3` and there is no final sentence.
pub fn compose<R: Rng + ?Sized>(
	pool: &SentencePool,
	n: usize,
	rng: &mut R,
) -> Result<Vec<String>, ComposeError> {
	let plan = Distribution::plan(pool, n)?;
	log::debug!("composing {} of {} requested sentences: {:?}", plan.total(), n, plan);

	if Distribution::is_small(n) {
		return Ok(sample(pool.instructions(), plan.instructions, rng));
	}

	let mut sequence = Vec::with_capacity(plan.total());
	sequence.extend(sample(pool.safety_notes(), plan.safety, rng));

	let spine = sample(pool.instructions(), plan.instructions, rng);
	let slots = choose_slots(spine.len(), plan.conditionals, rng);
	let conditionals = sample(pool.conditionals(), slots.len(), rng);
	sequence.extend(interleave(spine, &slots, conditionals));

	sequence.extend(sample(pool.finals(), plan.finals, rng));
	Ok(sequence)
}

/// Generator for a composition run: seeded when `seed` is given, from OS
/// entropy otherwise.
pub fn make_rng(seed: Option<u64>) -> StdRng {
	match seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_os_rng(),
	}
}

/// Picks up to `amount` distinct entries of `items`, in random order.
///
/// The source slice is left untouched.
pub fn sample<R: Rng + ?Sized>(items: &[String], amount: usize, rng: &mut R) -> Vec<String> {
	let amount = amount.min(items.len());
	index::sample(rng, items.len(), amount)
		.into_iter()
		.map(|i| items[i].clone())
		.collect()
}

/// Picks up to `amount` distinct odd positions below `spine_len`, ascending.
///
/// The count is capped to the available slots before sampling, so this
/// always terminates.
pub fn choose_slots<R: Rng + ?Sized>(spine_len: usize, amount: usize, rng: &mut R) -> Vec<usize> {
	let slots = odd_slots(spine_len);
	let mut positions: Vec<usize> = index::sample(rng, slots, amount.min(slots))
		.into_iter()
		.map(|slot| 2 * slot + 1)
		.collect();
	positions.sort_unstable();
	positions
}

/// Places `conditionals` into `spine` at `positions`.
///
/// Positions refer to the original spine: the conditional for position `p`
/// ends up right before original element `p`. Applied one by one this is an
/// insert at `p + k`, `k` being the number of conditionals already placed.
///
/// `positions` must be ascending and distinct; extra conditionals or
/// positions past the end of the spine are ignored.
pub fn interleave(spine: Vec<String>, positions: &[usize], conditionals: Vec<String>) -> Vec<String> {
	let mut sequence = Vec::with_capacity(spine.len() + conditionals.len());
	let mut pending = positions.iter().copied().zip(conditionals).peekable();

	for (index, sentence) in spine.into_iter().enumerate() {
		if let Some((_, conditional)) = pending.next_if(|(position, _)| *position == index) {
			sequence.push(conditional);
		}
		sequence.push(sentence);
	}

	sequence
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use pretty_assertions::assert_eq;

	use super::*;
	use crate::instructions::pool::Category;

	fn strings(items: &[&str]) -> Vec<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	fn reference_pool() -> SentencePool {
		SentencePool::new(
			strings(&["S1"]),
			strings(&["A", "B", "C", "D", "E"]),
			strings(&["C1"]),
			strings(&["F1"]),
		)
		.unwrap()
	}

	fn large_pool() -> SentencePool {
		let make = |prefix: &str| -> Vec<String> { (0..40).map(|i| format!("{prefix}{i}")).collect() };
		SentencePool::new(make("safety "), make("step "), make("if "), make("final ")).unwrap()
	}

	#[test]
	fn reference_scenario() {
		let pool = reference_pool();
		for seed in 0..50 {
			let mut rng = StdRng::seed_from_u64(seed);
			let result = compose(&pool, 5, &mut rng).unwrap();

			assert_eq!(result.len(), 5);
			assert_eq!(result[0], "S1");
			assert_eq!(result[4], "F1");
			// Two instructions with the conditional in the single slot between them
			assert_eq!(result[2], "C1");
			assert_eq!(pool.category_of(&result[1]), Some(Category::Instructions));
			assert_eq!(pool.category_of(&result[3]), Some(Category::Instructions));
			assert_ne!(result[1], result[3]);
		}
	}

	#[test]
	fn small_requests_draw_instructions_only() {
		let pool = reference_pool();
		let mut rng = StdRng::seed_from_u64(7);
		for n in 1..=3 {
			let result = compose(&pool, n, &mut rng).unwrap();
			assert_eq!(result.len(), n);
			assert!(result.iter().all(|s| pool.category_of(s) == Some(Category::Instructions)));
			assert_eq!(result.iter().collect::<HashSet<_>>().len(), n);
		}
	}

	#[test]
	fn small_requests_clamp_to_the_pool() {
		let pool = SentencePool::new(vec![], strings(&["A", "B"]), vec![], vec![]).unwrap();
		let result = compose(&pool, 3, &mut StdRng::seed_from_u64(1)).unwrap();
		assert_eq!(result.len(), 2);
		assert_ne!(result[0], result[1]);
	}

	#[test]
	fn zero_count_is_rejected() {
		let result = compose(&reference_pool(), 0, &mut StdRng::seed_from_u64(1));
		assert!(matches!(result, Err(ComposeError::InvalidCount(0))));
	}

	#[test]
	fn missing_finals_are_rejected() {
		let pool = SentencePool::new(strings(&["S1"]), strings(&["A", "B", "C"]), vec![], vec![]).unwrap();
		let result = compose(&pool, 4, &mut StdRng::seed_from_u64(1));
		assert!(matches!(result, Err(ComposeError::InvalidPool(_))));
	}

	#[test]
	fn same_seed_same_sequence() {
		let pool = large_pool();
		let first = compose(&pool, 20, &mut StdRng::seed_from_u64(42)).unwrap();
		let second = compose(&pool, 20, &mut StdRng::seed_from_u64(42)).unwrap();
		assert_eq!(first, second);
	}

	#[test]
	fn safety_notes_and_spine_are_shuffled() {
		let pool = large_pool();
		let source_order = |list: &[String], result: &[String]| -> Vec<usize> {
			result.iter().filter_map(|s| list.iter().position(|entry| entry == s)).collect()
		};

		let mut shuffled_safety = 0;
		let mut shuffled_spine = 0;
		for seed in 0..20 {
			let result = compose(&pool, 20, &mut StdRng::seed_from_u64(seed)).unwrap();
			let safety = source_order(pool.safety_notes(), &result);
			let spine = source_order(pool.instructions(), &result);
			assert_eq!(safety.len(), 4);
			assert_eq!(spine.len(), 13);

			if !safety.is_sorted() {
				shuffled_safety += 1;
			}
			if !spine.is_sorted() {
				shuffled_spine += 1;
			}
		}

		assert!(shuffled_safety > 0, "safety notes always came out in source order");
		assert!(shuffled_spine > 0, "instructions always came out in source order");
	}

	#[test]
	fn sample_does_not_keep_source_order() {
		let items: Vec<String> = (0..30).map(|i| format!("{i:02}")).collect();
		let shuffled = (0..10)
			.map(|seed| sample(&items, 10, &mut StdRng::seed_from_u64(seed)))
			.filter(|picked| !picked.is_sorted())
			.count();
		assert!(shuffled > 0);
	}

	#[test]
	fn make_rng_is_reproducible_when_seeded() {
		let pool = large_pool();
		let first = compose(&pool, 15, &mut make_rng(Some(8))).unwrap();
		let second = compose(&pool, 15, &mut make_rng(Some(8))).unwrap();
		assert_eq!(first, second);
	}

	#[test]
	fn pool_survives_repeated_use() {
		let pool = large_pool();
		let snapshot = pool.clone();
		let mut rng = StdRng::seed_from_u64(3);
		for _ in 0..10 {
			compose(&pool, 12, &mut rng).unwrap();
		}
		assert_eq!(pool, snapshot);
	}

	#[test]
	fn under_fill_never_repeats() {
		let pool = SentencePool::new(
			strings(&["S1"]),
			strings(&["A", "B"]),
			strings(&["C1", "C2", "C3"]),
			strings(&["F1"]),
		)
		.unwrap();
		let result = compose(&pool, 30, &mut StdRng::seed_from_u64(9)).unwrap();

		// Two instructions leave one slot, so only one conditional fits
		assert_eq!(result.len(), 5);
		assert_eq!(result[0], "S1");
		assert_eq!(result.iter().collect::<HashSet<_>>().len(), result.len());
		assert_eq!(result.last().map(String::as_str), Some("F1"));
	}

	#[test]
	fn slots_are_odd_distinct_and_bounded() {
		let mut rng = StdRng::seed_from_u64(11);
		for spine_len in 0..20 {
			for amount in 0..12 {
				let positions = choose_slots(spine_len, amount, &mut rng);
				assert_eq!(positions.len(), amount.min(spine_len / 2));
				assert!(positions.iter().all(|p| p % 2 == 1 && *p < spine_len));
				assert!(positions.windows(2).all(|w| w[0] < w[1]));
			}
		}
	}

	#[test]
	fn interleave_uses_original_indices() {
		let spine = strings(&["s0", "s1", "s2", "s3", "s4"]);
		let result = interleave(spine, &[1, 3], strings(&["c1", "c3"]));
		assert_eq!(result, strings(&["s0", "c1", "s1", "s2", "c3", "s3", "s4"]));
	}

	#[test]
	fn interleave_without_positions_keeps_the_spine() {
		let spine = strings(&["s0", "s1"]);
		assert_eq!(interleave(spine.clone(), &[], vec![]), spine);
	}

	#[test]
	fn conditionals_sit_between_instructions() {
		let pool = large_pool();
		for seed in 0..30 {
			let result = compose(&pool, 30, &mut StdRng::seed_from_u64(seed)).unwrap();
			let body: Vec<Category> = result
				.iter()
				.filter_map(|s| pool.category_of(s))
				.filter(|c| matches!(c, Category::Instructions | Category::Conditionals))
				.collect();

			assert_eq!(body.first(), Some(&Category::Instructions));
			assert_eq!(body.last(), Some(&Category::Instructions));
			assert!(body
				.windows(2)
				.all(|w| !(w[0] == Category::Conditionals && w[1] == Category::Conditionals)));
		}
	}
}
