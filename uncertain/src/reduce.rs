use crate::comm::Communicator;
use crate::{Error, SDouble};

/// Collects one value from every process in the group, ordered by rank.
///
/// This is a blocking collective: every process must call it.
pub fn gather<C: Communicator + ?Sized>(comm: &C, local: f64) -> Result<Vec<f64>, Error> {
    let size = comm.size();
    debug_assert!(comm.rank() < size);
    let buf = comm.all_gather(local)?;
    if buf.len() != size {
        return Err(Error::WrongLength {
            expected: size,
            got: buf.len(),
        });
    }
    Ok(buf)
}

/// Builds an [`SDouble`] whose sample is one value from each process.
///
/// Every process gets the same result.
pub fn reduce<C: Communicator + ?Sized>(comm: &C, local: f64) -> Result<SDouble, Error> {
    Ok(SDouble::from(gather(comm, local)?))
}
