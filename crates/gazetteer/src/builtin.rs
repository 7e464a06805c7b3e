use crate::place::PlaceNode;

/// The dictionary shipped with the crate.
pub fn places() -> Vec<PlaceNode> {
    vec![
        PlaceNode::new(["ES", "Spain"]).at(40.463667, -3.74922),
        PlaceNode::new(["US", "USA", "United States", "United States of America"])
            .at(37.09024, -95.712891)
            .with_child(
                PlaceNode::new(["TX", "Texas"])
                    .with_child(PlaceNode::new(["Dallas"]).at(32.7801399, -96.8004511)),
            ),
        PlaceNode::new(["CD", "DRC", "Democratic Republic of the Congo"]).with_child(
            PlaceNode::new(["ZZ"])
                .with_child(PlaceNode::new(["Lokolia"]).at(-0.583, 20.55))
                .with_child(
                    PlaceNode::new(["Watsikengo", "Watsi kengo", "Watsi Kengo"]).at(-0.8, 20.55),
                ),
        ),
        PlaceNode::new(["GN", "Guinea"]).at(9.945587, -9.696645),
        PlaceNode::new(["LR", "Liberia"]).at(6.428055, -9.429499),
        PlaceNode::new(["SL", "Sierra Leone"]).at(8.460555, -11.779889),
        PlaceNode::new(["NG", "Nigeria"]).at(9.081999, 8.675277),
        PlaceNode::new(["SN", "Senegal"]).at(14.497401, -14.452362),
        PlaceNode::new(["ML", "Mali"]).at(17.570692, -3.996166),
    ]
}

#[cfg(test)]
mod tests {
    use super::places;
    use crate::place::overlapping_aliases;

    #[test]
    fn builtin_aliases_do_not_overlap() {
        assert!(overlapping_aliases(&places()).is_empty());
    }

    #[test]
    fn builtin_coordinates_are_in_range() {
        fn walk(nodes: &[crate::PlaceNode]) {
            for n in nodes {
                if let Some(c) = n.coordinates {
                    assert!(c.is_valid(), "{:?} has {c:?}", n.names);
                }
                walk(&n.children);
            }
        }
        walk(&places());
    }
}
