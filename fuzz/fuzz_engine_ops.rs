//! Fuzz target for engine gesture sequences.
//!
//! Run with: cargo +nightly fuzz run fuzz_engine_ops
//!
//! Each input byte becomes one gesture against a small fixed forest. After
//! every gesture the selection must fit its capacity and every selected
//! leaf must be bound to a leaf of the current snapshot.

#![no_main]

use std::num::NonZeroUsize;

use canopy_core::{ClickEvent, Engine, EngineOptions, Modifiers, NodeKey, Tree, TreeNode};
use canopy_config::{ClickMode, OverflowPolicy};
use libfuzzer_sys::fuzz_target;

const KEYS: [&str; 9] = ["a", "a1", "a2", "b", "b1", "b2", "b3", "c", "c1"];

fn snapshot() -> Tree {
    let forest = vec![
        TreeNode::category(
            "a",
            "Alpha",
            vec![
                TreeNode::leaf("a1", "One"),
                TreeNode::category(
                    "b",
                    "Beta",
                    vec![
                        TreeNode::leaf("b1", "Two"),
                        TreeNode::leaf("b2", "Three"),
                        TreeNode::leaf("b3", "Four"),
                    ],
                ),
                TreeNode::leaf("a2", "Five"),
            ],
        ),
        TreeNode::category("c", "Gamma", vec![TreeNode::leaf("c1", "Six")]),
    ];
    Tree::from_nodes(forest).unwrap_or_default()
}

fuzz_target!(|data: &[u8]| {
    let Some((&header, ops)) = data.split_first() else {
        return;
    };
    let capacity = NonZeroUsize::new(usize::from(header & 0x03) + 1).unwrap_or(NonZeroUsize::MIN);
    let options = EngineOptions::default()
        .with_capacity(capacity)
        .with_overflow(if header & 0x04 == 0 {
            OverflowPolicy::EvictOldest
        } else {
            OverflowPolicy::ReplaceAll
        })
        .with_click_mode(if header & 0x08 == 0 {
            ClickMode::Toggle
        } else {
            ClickMode::Modifier
        });
    let mut engine = Engine::new(options);
    engine.on_snapshot_replaced(snapshot());

    for &byte in ops {
        let key = NodeKey::from(KEYS[usize::from(byte & 0x0f) % KEYS.len()]);
        let Some(node) = engine.find(&key) else {
            continue;
        };
        match byte >> 4 {
            0..=7 => {
                let modifiers = if byte & 0x40 == 0 {
                    Modifiers::NONE
                } else {
                    Modifiers::ctrl()
                };
                engine.handle_node_click(node, &ClickEvent::with_modifiers(modifiers));
            }
            8..=10 => {
                engine.handle_expand(node);
            }
            11..=13 => {
                engine.handle_collapse(node);
            }
            14 => {
                engine.on_snapshot_replaced(snapshot());
            }
            _ => {
                engine.clear_selection();
            }
        }

        assert!(engine.selection().len() <= capacity.get());
        for entry in engine.selection().iter() {
            let bound = entry.node().and_then(|r| engine.tree().node(r));
            assert!(bound.is_some_and(|n| n.is_leaf() && n.key() == entry.key()));
        }
    }
});
