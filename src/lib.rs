/*!
This library implements [Latin Hypercube](https://en.wikipedia.org/wiki/Latin_hypercube_sampling)
designs of experiments, their optimization, and the
[orthogonal arrays](https://en.wikipedia.org/wiki/Orthogonal_array) built over Galois fields
that can seed them.

A latin hypercube of `n` points in `k` dimensions splits every dimension in `n` strata and
places exactly one point in each stratum of each dimension. The generators return designs
in the unit hypercube, the [`SamplingMethod`] facade scales them to a design space `xlimits`
given as a 2D ndarray `(nx, 2)` of lower and upper bounds.

Example:
```
use oalhs::{Lhs, LhsKind, OptimumParams, SamplingMethod};
use ndarray::arr2;

// Design space is defined as [5., 10.] x [0., 1.], samples are 2-dimensional.
let xlimits = arr2(&[[5., 10.], [0., 1.]]);
// We generate five samples using centered Latin Hypercube sampling.
let samples = Lhs::new(&xlimits).kind(LhsKind::Centered).sample(5).unwrap();
// or else a reproducible design improved by column sweeps
let samples = Lhs::new(&xlimits)
    .kind(LhsKind::Optimum(OptimumParams::default()))
    .seed(42)
    .sample(5)
    .unwrap();
```

Generators can also be called directly with an explicit random stream:
```
use oalhs::{create_oalhs, improved_lhs, is_valid_lhs, RandomStream};

let mut rng = RandomStream::from_seed(42);
let design = improved_lhs(10, 3, 2, &mut rng).unwrap();
assert!(is_valid_lhs(&design));

// a latin hypercube built on an orthogonal array of strength 2
let oalhs = create_oalhs(25, 4, true, false, &mut rng).unwrap();
assert!(oalhs.oa.is_orthogonal(2).unwrap());
```

This library contains:
* [Latin Hypercube generators](crate::lhs) (random, centered, improved, maximin, optimum,
  genetic, ESE and orthogonal array based),
* [Orthogonal arrays](crate::oa) (Bose, Bush, Bose-Bush and Addelman-Kempthorne families),
* [Galois fields](crate::GaloisField),
* [Distances and optimality criteria](crate::distance).

*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
pub mod distance;
mod errors;
mod gf;
pub mod lhs;
mod matrix;
pub mod oa;
pub mod params;
mod random;
mod sampling;
pub mod utils;

pub use distance::{Criterion, Score};
pub use errors::*;
pub use gf::*;
pub use lhs::*;
pub use matrix::*;
pub use oa::{build_oa, select_design, OaDesign, OaFamily, OaRequest, OrthogonalArray};
pub use random::RandomStream;
pub use sampling::*;
