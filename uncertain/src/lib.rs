/*! Uncertain doubles: sample accumulators with error propagation.

An [`SDouble`] collects observations and reports their mean together with
the standard error of the mean.  Combining `SDouble`s arithmetically
propagates the errors to first order, assuming the operands are independent.

## Example

```
# use uncertain::*;
let mut x = SDouble::new();
for v in [1., 2., 3.] {
    x.push(v);
}
assert_eq!(x.mean(), 2.);

let y = SDouble::with_error(50., 1.);
let z = SDouble::with_error(100., 3.) + &y;
assert_eq!(z.to_string(), "150 +- 3.1622776601683795");
```

## Gathering across processes

[`reduce()`] turns one value per process into a single `SDouble`, using any
runtime that implements [`Communicator`]:

```
# use uncertain::*;
let x = reduce(&SingleProcess, 4.).unwrap();
assert_eq!(x.samples(), &[4.]);
```

*/

mod comm;
mod reduce;
mod sdouble;
mod summary;

pub use comm::*;
pub use reduce::*;
pub use sdouble::*;
pub use summary::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// Another process left the group before the collective finished
    Disconnected,
    /// The runtime returned a buffer which doesn't have one value per process
    WrongLength { expected: usize, got: usize },
}

use std::fmt;
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Disconnected => f.write_str("A process left the group during a collective"),
            Error::WrongLength { expected, got } => write!(
                f,
                "Expected one value from each of {} processes, got {}",
                expected, got
            ),
        }
    }
}
impl std::error::Error for Error {}
