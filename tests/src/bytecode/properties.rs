//! Properties that hold for every input, not just hand-picked fixtures.

use crate::fixtures::arm;
use proptest::prelude::*;
use vigil_analysis::profile;
use vigil_core::{
    decoder::decode,
    detection::{extract_selectors, looks_like_eip1167, EIP1167_SIGNATURE},
    Selector,
};

proptest! {
    #[test]
    fn walker_covers_input_exactly(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let ins = decode(&bytes);
        prop_assert!(ins.len() <= bytes.len());
        if let Some(first) = ins.first() {
            prop_assert_eq!(first.pc, 0);
        }
        for pair in ins.windows(2) {
            prop_assert_eq!(pair[1].pc, pair[0].pc + pair[0].byte_size());
        }
        if let Some(last) = ins.last() {
            prop_assert!(last.pc < bytes.len());
            prop_assert!(last.pc + last.byte_size() >= bytes.len());
            // only the final instruction may be short
            prop_assert!(ins[..ins.len() - 1].iter().all(|i| !i.is_truncated()));
        }
    }

    #[test]
    fn profile_never_exceeds_instruction_count(
        bytes in proptest::collection::vec(any::<u8>(), 0..512)
    ) {
        let ins = decode(&bytes);
        prop_assert!(profile(&ins).total() <= ins.len());
    }

    #[test]
    fn selectors_are_capped_and_unique(bytes in proptest::collection::vec(any::<u8>(), 0..1024)) {
        let selectors = extract_selectors(&decode(&bytes), 40);
        prop_assert!(selectors.len() <= 40);
        let mut seen = std::collections::HashSet::new();
        prop_assert!(selectors.iter().all(|s| seen.insert(*s)));
    }

    #[test]
    fn dispatcher_arms_found_in_order(
        sels in proptest::collection::btree_set(any::<u32>(), 0..60)
    ) {
        let sels: Vec<u32> = sels.into_iter().collect();
        let code: Vec<u8> = sels.iter().flat_map(|s| arm(*s, 0x0100)).collect();

        let expected: Vec<Selector> =
            sels.iter().take(40).map(|s| Selector::from_u32(*s)).collect();
        prop_assert_eq!(extract_selectors(&decode(&code), 40), expected);
    }

    #[test]
    fn eip1167_found_wherever_embedded(
        prefix in proptest::collection::vec(any::<u8>(), 0..64),
        suffix in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut code = prefix;
        code.extend_from_slice(&EIP1167_SIGNATURE);
        code.extend(suffix);
        prop_assert!(looks_like_eip1167(&code));
    }
}
