use anyhow::Result;

#[cfg(feature = "mt")]
use rayon::prelude::*;

use crate::ctx::SubjectRecord;

/// Applies `f` to every subject record. Records are independent; with the
/// `mt` feature they are processed on a rayon pool of `threads` workers
/// (0 = rayon default). Record order is unchanged either way.
pub fn for_each_subject<F>(subjects: &mut [SubjectRecord], threads: usize, f: F) -> Result<()>
where
    F: Fn(&mut SubjectRecord) + Sync + Send,
{
    #[cfg(feature = "mt")]
    {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if threads > 0 {
            builder = builder.num_threads(threads);
        }
        let pool = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build thread pool: {}", e))?;
        pool.install(|| subjects.par_iter_mut().for_each(|s| f(s)));
    }

    #[cfg(not(feature = "mt"))]
    {
        let _ = threads;
        subjects.iter_mut().for_each(|s| f(s));
    }

    Ok(())
}
