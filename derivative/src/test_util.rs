use std::fmt::Debug;

use num::Signed;

use crate::field::{Field, Pixel};

pub fn all_close<T, K, I>(a: T, b: K, tol: I) -> bool
where
    T: Clone + IntoIterator<Item = I> + Debug,
    K: Clone + IntoIterator<Item = I> + Debug,
    I: Signed + PartialOrd,
{
    let ai = a.clone().into_iter();
    let bi = b.clone().into_iter();

    if ai.zip(bi).map(|(x, y)| (x - y).abs()).all(|x| x < tol) {
        true
    } else {
        println!("left: {:?}", a);
        println!("right: {:?}", b);
        false
    }
}

/// Every sample of `field`, in logical order.
pub fn samples<T: Pixel, const D: usize>(field: &Field<T, D>) -> Vec<T> {
    field.data().iter().copied().collect()
}
