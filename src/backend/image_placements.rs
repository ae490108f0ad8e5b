//! Content stream interpretation for image placements.
//!
//! An image XObject paints the unit square under the current transformation
//! matrix, so `q`/`Q`/`cm` tracking is all it takes to place each `Do`.

use lopdf::content::Operation;
use lopdf::Object;

use super::text_runs::number;
use crate::geometry::Affine;

/// One `Do` with the CTM in effect.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct XObjectPlacement {
    /// Resource name of the XObject
    pub(super) name: Vec<u8>,

    /// Unit square to document space
    pub(super) ctm: Affine,
}

/// Collect every `Do` in paint order.
pub(super) fn collect_placements(operations: &[Operation]) -> Vec<XObjectPlacement> {
    let mut ctm = Affine::IDENTITY;
    let mut stack = Vec::new();
    let mut placements = Vec::new();

    for op in operations {
        match op.operator.as_str() {
            "q" => stack.push(ctm),
            "Q" => {
                if let Some(saved) = stack.pop() {
                    ctm = saved;
                }
            }
            "cm" => {
                let coeffs: Vec<f64> = op.operands.iter().filter_map(number).collect();
                if let &[a, b, c, d, e, f] = coeffs.as_slice() {
                    ctm = ctm * Affine::new([a, b, c, d, e, f]);
                }
            }
            "Do" => {
                if let Some(Object::Name(name)) = op.operands.first() {
                    placements.push(XObjectPlacement {
                        name: name.clone(),
                        ctm,
                    });
                }
            }
            _ => {}
        }
    }
    placements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cm(values: [i64; 6]) -> Operation {
        Operation::new("cm", values.iter().map(|v| Object::Integer(*v)).collect())
    }

    fn draw(name: &str) -> Operation {
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())])
    }

    #[test]
    fn test_ctm_concatenates_and_restores() {
        let ops = vec![
            cm([1, 0, 0, 1, 10, 20]),
            Operation::new("q", vec![]),
            cm([100, 0, 0, 50, 0, 0]),
            draw("Im1"),
            Operation::new("Q", vec![]),
            draw("Im2"),
        ];
        let placements = collect_placements(&ops);
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[0].name, b"Im1");
        assert_eq!(placements[0].ctm, Affine::new([100.0, 0.0, 0.0, 50.0, 10.0, 20.0]));
        assert_eq!(placements[1].ctm, Affine::new([1.0, 0.0, 0.0, 1.0, 10.0, 20.0]));
    }

    #[test]
    fn test_malformed_operators_ignored() {
        let ops = vec![
            Operation::new("cm", vec![Object::Integer(2)]),
            Operation::new("Q", vec![]),
            Operation::new("Do", vec![Object::Integer(3)]),
            draw("X"),
        ];
        let placements = collect_placements(&ops);
        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].ctm, Affine::IDENTITY);
    }
}
