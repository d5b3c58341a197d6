#![no_main]
use canopy_fuzz::{perform_action, FuzzTree, TreeAction};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|actions: Vec<TreeAction>| {
    let mut t = FuzzTree::new();
    let mut keys = Vec::new();
    for action in actions {
        perform_action(&mut t, &mut keys, action);
        assert!(t.tree().is_valid_red_black_tree());
    }
});
