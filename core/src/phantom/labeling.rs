use ndarray::Array2;
use std::collections::VecDeque;

const FOUR_NEIGHBORS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const EIGHT_NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Pixel adjacency used when growing components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// Edge neighbors only
    Four,
    /// Edge and corner neighbors
    Eight,
}

impl Connectivity {
    fn offsets(&self) -> &'static [(isize, isize)] {
        match self {
            Connectivity::Four => &FOUR_NEIGHBORS,
            Connectivity::Eight => &EIGHT_NEIGHBORS,
        }
    }
}

/// One connected foreground region
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// 1-based label as written into the label image
    pub label: u32,
    /// Pixel count
    pub area: usize,
    sum_row: f64,
    sum_col: f64,
}

impl Component {
    /// Centroid as `(row, column)`
    pub fn centroid(&self) -> (f64, f64) {
        let n = self.area.max(1) as f64;
        (self.sum_row / n, self.sum_col / n)
    }

    /// Radius of the circle with the same area
    pub fn equivalent_radius(&self) -> f64 {
        (self.area as f64 / std::f64::consts::PI).sqrt()
    }
}

/// Labels the connected `true` regions of a binary mask
///
/// Labels are assigned in raster order of each component's first pixel.
/// Background pixels keep label 0.
pub fn label_components(
    binary: &Array2<bool>,
    connectivity: Connectivity,
) -> (Array2<u32>, Vec<Component>) {
    let (rows, cols) = binary.dim();
    let mut labels = Array2::<u32>::zeros((rows, cols));
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for r in 0..rows {
        for c in 0..cols {
            if !binary[[r, c]] || labels[[r, c]] != 0 {
                continue;
            }

            let label = components.len() as u32 + 1;
            let mut component = Component {
                label,
                area: 0,
                sum_row: 0.0,
                sum_col: 0.0,
            };

            labels[[r, c]] = label;
            queue.push_back((r, c));

            while let Some((pr, pc)) = queue.pop_front() {
                component.area += 1;
                component.sum_row += pr as f64;
                component.sum_col += pc as f64;

                for &(dr, dc) in connectivity.offsets() {
                    let nr = pr as isize + dr;
                    let nc = pc as isize + dc;
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        continue;
                    }
                    let (nr, nc) = (nr as usize, nc as usize);
                    if binary[[nr, nc]] && labels[[nr, nc]] == 0 {
                        labels[[nr, nc]] = label;
                        queue.push_back((nr, nc));
                    }
                }
            }

            components.push(component);
        }
    }

    (labels, components)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&str]) -> Array2<bool> {
        let h = rows.len();
        let w = rows[0].len();
        Array2::from_shape_fn((h, w), |(r, c)| rows[r].as_bytes()[c] == b'#')
    }

    #[test]
    fn test_diagonal_pixels_depend_on_connectivity() {
        let mask = mask_from(&["#..", ".#.", "..#"]);
        let (_, four) = label_components(&mask, Connectivity::Four);
        let (_, eight) = label_components(&mask, Connectivity::Eight);
        assert_eq!(four.len(), 3);
        assert_eq!(eight.len(), 1);
        assert_eq!(eight[0].area, 3);
    }

    #[test]
    fn test_labels_in_raster_order() {
        let mask = mask_from(&["##..#", "##..#", "....."]);
        let (labels, comps) = label_components(&mask, Connectivity::Eight);
        assert_eq!(comps.len(), 2);
        assert_eq!(labels[[0, 0]], 1);
        assert_eq!(labels[[1, 4]], 2);
        assert_eq!(comps[0].area, 4);
        assert_eq!(comps[0].centroid(), (0.5, 0.5));
        assert_eq!(labels[[2, 2]], 0);
    }

    #[test]
    fn test_equivalent_radius() {
        let comp = Component {
            label: 1,
            area: 314,
            sum_row: 0.0,
            sum_col: 0.0,
        };
        assert!((comp.equivalent_radius() - 9.997).abs() < 0.01);
    }
}
