use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn test_two_clades_sixty_forty() {
    let scores = score_diversity(&[60, 40]);
    assert!(close(scores.n_effective_surplus_clades, 1.0 / 0.52 - 1.0));
    assert!(close(scores.contamination_portion, 0.4));
}

#[test]
fn test_uneven_clades() {
    // 15^2 / (4 + 64 + 1 + 1 + 9) - 1
    assert!(close(effective_surplus_clades(&[2, 8, 1, 1, 3]), 225.0 / 79.0 - 1.0));
    assert!(close(contamination_portion(&[1, 2, 3, 4]), 0.6));
}

#[test]
fn test_single_or_no_clade_is_clean() {
    assert_eq!(score_diversity(&[120]).n_effective_surplus_clades, 0.0);
    assert_eq!(score_diversity(&[120]).contamination_portion, 0.0);
    assert_eq!(score_diversity(&[]).n_effective_surplus_clades, 0.0);
    assert_eq!(score_diversity(&[]).contamination_portion, 0.0);
}

#[test]
fn test_even_clades_surplus() {
    assert!(close(effective_surplus_clades(&[5, 5, 5, 5]), 3.0));
    assert!(close(contamination_portion(&[5, 5, 5, 5]), 0.75));
}
