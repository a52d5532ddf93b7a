use ndarray::Array2;

use super::matte_generator::AlphaMatte;

/// Offsets of the 3x3 elliptical structuring element (a plus shape).
const CROSS_3X3: [(isize, isize); 5] = [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)];

/// Grayscale erosion: each sample becomes the minimum of its neighborhood.
/// Out-of-frame neighbors are ignored.
pub fn erode(alpha: &AlphaMatte) -> AlphaMatte {
    apply(alpha, u8::MAX, u8::min)
}

/// Grayscale dilation: each sample becomes the maximum of its neighborhood.
pub fn dilate(alpha: &AlphaMatte) -> AlphaMatte {
    apply(alpha, u8::MIN, u8::max)
}

/// Erode then dilate: removes isolated specks smaller than the element.
pub fn open(alpha: &AlphaMatte) -> AlphaMatte {
    dilate(&erode(alpha))
}

/// Dilate then erode: fills pinholes smaller than the element.
pub fn close(alpha: &AlphaMatte) -> AlphaMatte {
    erode(&dilate(alpha))
}

fn apply(alpha: &AlphaMatte, init: u8, combine: fn(u8, u8) -> u8) -> AlphaMatte {
    let (h, w) = alpha.dim();
    Array2::from_shape_fn((h, w), |(y, x)| {
        CROSS_3X3.iter().fold(init, |acc, &(dy, dx)| {
            let ny = y as isize + dy;
            let nx = x as isize + dx;
            if ny < 0 || nx < 0 || ny >= h as isize || nx >= w as isize {
                acc
            } else {
                combine(acc, alpha[[ny as usize, nx as usize]])
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn plane(h: usize, w: usize, value: u8) -> AlphaMatte {
        Array2::from_elem((h, w), value)
    }

    #[test]
    fn test_open_removes_isolated_speck() {
        let mut alpha = plane(5, 5, 0);
        alpha[[2, 2]] = 255;
        assert!(open(&alpha).iter().all(|&v| v == 0));
    }

    #[test]
    fn test_close_fills_pinhole() {
        let mut alpha = plane(5, 5, 255);
        alpha[[2, 2]] = 0;
        assert!(close(&alpha).iter().all(|&v| v == 255));
    }

    #[test]
    fn test_uniform_planes_are_fixed_points() {
        for value in [0u8, 255] {
            let alpha = plane(4, 4, value);
            assert_eq!(open(&alpha), alpha);
            assert_eq!(close(&alpha), alpha);
        }
    }

    #[test]
    fn test_dilate_grows_cross() {
        let mut alpha = plane(3, 3, 0);
        alpha[[1, 1]] = 200;
        let out = dilate(&alpha);
        assert_eq!(out[[0, 1]], 200);
        assert_eq!(out[[1, 0]], 200);
        // corners are outside the cross
        assert_eq!(out[[0, 0]], 0);
    }

    #[test]
    fn test_erode_ignores_border() {
        let alpha = plane(2, 2, 180);
        assert_eq!(erode(&alpha), alpha);
    }

    #[test]
    fn test_large_region_survives_open() {
        let mut alpha = plane(8, 8, 0);
        for y in 2..6 {
            for x in 2..6 {
                alpha[[y, x]] = 255;
            }
        }
        let opened = open(&alpha);
        assert_eq!(opened[[3, 3]], 255);
        assert_eq!(opened[[0, 0]], 0);
    }
}
