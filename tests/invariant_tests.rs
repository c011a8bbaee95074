use std::net::IpAddr;

use proptest::collection::vec as pvec;
use proptest::prelude::*;

use meshpool::{Error, PoolRegistry, RootConfig};

fn fresh_registry() -> (PoolRegistry, meshpool::PoolId) {
    let reg = PoolRegistry::new();
    let root = reg
        .create_root(
            RootConfig::new("10.0.0.0/16".parse().unwrap()).prefix_bounds(17, 27, 28),
        )
        .unwrap();
    (reg, root)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Partition, status coherence and conservation hold after every
    /// operation of an arbitrary allocate/free/reserve interleaving, and
    /// releasing everything coalesces back to a pristine root.
    #[test]
    fn random_op_sequences_preserve_invariants(
        ops in pvec((0u8..3, 24u8..=28u8, any::<u8>()), 1..48)
    ) {
        let (reg, root) = fresh_registry();
        let mut held = Vec::new();

        for (kind, plen, sel) in ops {
            match kind {
                0 => match reg.allocate(root, Some(plen), None) {
                    Ok(h) => held.push(h),
                    Err(Error::CapacityExhausted) => {}
                    Err(e) => prop_assert!(false, "unexpected allocate error: {e}"),
                },
                1 => {
                    if !held.is_empty() {
                        let h = held.swap_remove(sel as usize % held.len());
                        prop_assert_eq!(reg.free(&h), Ok(()));
                    }
                }
                _ => {
                    let net: IpAddr = format!("10.0.{sel}.0").parse().unwrap();
                    match reg.reserve(root, net, 24, false, None) {
                        Ok(Some(h)) => held.push(h),
                        Ok(None) => prop_assert!(false, "committed reserve returned no handle"),
                        Err(Error::Conflict) => {}
                        Err(e) => prop_assert!(false, "unexpected reserve error: {e}"),
                    }
                }
            }
            prop_assert_eq!(reg.verify(root), Ok(()));
            let usage = reg.usage(root).unwrap();
            prop_assert_eq!(usage.allocated + usage.free, usage.total);
        }

        for h in held.drain(..) {
            prop_assert_eq!(reg.free(&h), Ok(()));
        }
        let pool = reg.get(root).unwrap();
        prop_assert!(pool.is_leaf());
        prop_assert_eq!(reg.usage(root).unwrap().allocated, 0);
    }

    /// A freshly split block always has capacity for any policy-conformant
    /// length, and the left bias pins the first allocation to the lowest
    /// address of the pool.
    #[test]
    fn fresh_root_satisfies_any_policy_length(plen in 17u8..=28u8) {
        let (reg, root) = fresh_registry();
        let h = reg.allocate(root, Some(plen), None);
        prop_assert!(h.is_ok(), "fresh root rejected /{plen}: {:?}", h);
        let h = h.unwrap();
        prop_assert_eq!(h.prefix_len, plen);
        prop_assert_eq!(h.network, "10.0.0.0".parse::<IpAddr>().unwrap());
        prop_assert_eq!(reg.verify(root), Ok(()));
    }

    /// Dry-run reservations are repeatable and commit nothing.
    #[test]
    fn check_only_never_mutates(octet in any::<u8>(), plen in 24u8..=28u8) {
        let (reg, root) = fresh_registry();
        let net: IpAddr = format!("10.0.{octet}.0").parse().unwrap();

        let first = reg.reserve(root, net, plen, true, None);
        let second = reg.reserve(root, net, plen, true, None);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first, Ok(None));

        let pool = reg.get(root).unwrap();
        prop_assert!(pool.is_leaf(), "dry run left splits behind");

        // The dry run predicted a commit would work
        let committed = reg.reserve(root, net, plen, false, None);
        prop_assert!(matches!(committed, Ok(Some(_))));
        prop_assert_eq!(reg.verify(root), Ok(()));
    }
}
