use sao_domain_utils::{Bid, Profile};

pub fn price_color_profile() -> Profile {
    Profile::from_yaml_str(
        r#"
        name: price-color
        domain:
          issues:
            Price: [10, 20, 30]
            Color: [Red, Blue]
        weights: {Price: 0.7, Color: 0.3}
        utilities:
          Price: {10: 1.0, 20: 0.5, 30: 0.0}
          Color: {Red: 1.0, Blue: 0.0}
        "#,
    )
    .unwrap()
}

pub fn bid(price: &str, color: &str) -> Bid {
    Bid::new().with("Price", price).with("Color", color)
}

/// Two issues `A` and `B` with values `0..size`, evaluated `value / (size - 1)`
/// and weighted equally.
pub fn grid_profile(size: u32) -> Profile {
    let values = (0..size).map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
    let evaluations = (0..size)
        .map(|v| format!("{}: {}", v, v as f64 / (size - 1) as f64))
        .collect::<Vec<_>>()
        .join(", ");
    Profile::from_yaml_str(&format!(
        r#"
        name: grid
        domain:
          issues: {{A: [{values}], B: [{values}]}}
        weights: {{A: 0.5, B: 0.5}}
        utilities:
          A: {{{evaluations}}}
          B: {{{evaluations}}}
        "#,
        values = values,
        evaluations = evaluations
    ))
    .unwrap()
}

pub fn grid_bid(a: u32, b: u32) -> Bid {
    Bid::new().with("A", a.to_string()).with("B", b.to_string())
}
