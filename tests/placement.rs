//! Partial materialisation: one blueprint, several "ranks", each building
//! only the components placed on it.
//!
//! This is the contract a placement layer relies on: conditional
//! registration, `exists` checks on both model and assembly, and late
//! `Set` wiring generated at expansion time.

use montage::prelude::*;
use montage_assembly::{Condition, Conditional, Draft, MetaConnector};
use montage_component::test_utils::IntBox;

const WORKERS: usize = 4;

fn placed_on(rank: usize) -> impl Fn(&Address) -> bool + Clone + 'static {
    move |address: &Address| {
        address
            .last()
            .parse::<usize>()
            .is_ok_and(|i| i % 2 == rank)
    }
}

/// Gives every worker present on this rank its peer id.
struct AssignPeers;

impl MetaConnector for AssignPeers {
    type Args = usize;

    fn connect(model: &mut Model<Draft>, rank: &usize) -> Result<(), AssemblyError> {
        for i in 0..WORKERS {
            let worker = addr!("workers", i);
            if model.exists(&worker) {
                let peer = (i * 10 + rank) as i32;
                model.connect::<Set<i32>>((PortAddress::new("value", worker), peer));
            }
        }
        Ok(())
    }
}

fn blueprint(rank: usize) -> Model {
    let mut model = Model::new();
    let workers = model.composite("workers");
    for i in 0..WORKERS {
        workers.meta_component::<Conditional<IntBox>>(
            i,
            Condition::new(placed_on(rank), || IntBox::new(-1)),
        );
    }
    model.meta_connect::<AssignPeers>(rank);
    model
}

#[test]
fn each_rank_builds_its_share() {
    for rank in 0..2 {
        let assembly = Assembly::with_config(
            &blueprint(rank),
            AssemblyConfig::new().with_prefix(format!("r{rank}_")),
        )
        .unwrap();
        let workers = assembly.composite(&addr!("workers")).unwrap();
        assert_eq!(workers.size(), WORKERS / 2);
        for i in 0..WORKERS {
            let address = addr!("workers", i);
            assert_eq!(assembly.exists(&address), i % 2 == rank);
        }
    }
}

#[test]
fn top_level_meta_runs_before_composite_meta() {
    // the composite's meta-operations run after the top-level ones, so
    // AssignPeers sees no workers yet and wires nothing
    let assembly = Assembly::new(&blueprint(1)).unwrap();
    for i in [1, 3] {
        assert_eq!(
            assembly.at::<IntBox>(&addr!("workers", i)).unwrap().value,
            -1
        );
    }
}

#[test]
fn wiring_after_placement_sees_every_present_worker() {
    let rank = 1;
    let mut model = Model::new();
    for i in 0..WORKERS {
        model.meta_component::<Conditional<IntBox>>(
            addr!("workers", i),
            Condition::new(placed_on(rank), || IntBox::new(-1)),
        );
    }
    model.meta_connect::<AssignPeers>(rank);

    let expanded = model.expand().unwrap();
    assert!(expanded.exists(&addr!("workers", 3)));
    assert!(!expanded.exists(&addr!("workers", 2)));

    let assembly = Assembly::from_expanded(expanded, AssemblyConfig::default()).unwrap();
    assert_eq!(assembly.at::<IntBox>(&addr!("workers", 1)).unwrap().value, 11);
    assert_eq!(assembly.at::<IntBox>(&addr!("workers", 3)).unwrap().value, 31);
    let err = assembly.at::<IntBox>(&addr!("workers", 2)).unwrap_err();
    assert_eq!(err.code(), "ADDRESS_NOT_FOUND");
}
