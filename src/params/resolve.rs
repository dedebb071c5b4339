//! Lowering of an [`OdrProblem`] into the raw argument bundle of the solver.
//!
//! [`resolve`] is the last point where arguments are typed: every buffer is
//! checked for contiguity and element count, every `Option` becomes a null
//! or valid pointer, and every dimension is narrowed to a C `int`. The
//! returned [`RawCall`] mutably borrows the problem, so the buffers cannot
//! move or be touched while the solver holds their addresses.

use std::marker::PhantomData;

use crate::{
    buffers::{
        validation::{element_count, to_c_int},
        views::{contiguous, contiguous_mut, Extent},
    },
    errors::OdrResult,
    odr::problem::OdrProblem,
    params::optional::{array_ptr, scalar_ptr, work_ptr},
    solver::RawCall,
};

/// Validate `problem` and lower it to solver arguments.
///
/// Unit numbers are left at the default `6`; the stream manager overwrites
/// them once files are open.
///
/// # Errors
/// - [`crate::errors::OdrError::InvalidSetting`] for non-finite settings.
/// - [`crate::errors::OdrError::NonContiguous`] /
///   [`crate::errors::OdrError::Dimension`] for any buffer that is not
///   C-contiguous or whose length differs from the count implied by the
///   declared dimensions.
/// - [`crate::errors::OdrError::TooLarge`] if a dimension or work length
///   exceeds `c_int::MAX`.
pub fn resolve<'p>(problem: &'p mut OdrProblem<'_>) -> OdrResult<RawCall<'p>> {
    problem.settings.validate()?;

    let d = problem.dims;
    let ld = problem.leading;
    let (n, m, npar, nq) = (d.n, d.m, d.npar, d.nq);

    let exactly = |name: &'static str, dims: &[usize]| -> OdrResult<Extent> {
        element_count(name, dims).map(Extent::Exactly)
    };

    let beta = contiguous_mut("beta", problem.beta.view_mut(), Extent::Exactly(npar))?;
    let y = contiguous("y", problem.y.view(), exactly("y", &[nq, n])?)?;
    let x = contiguous("x", problem.x.view(), exactly("x", &[m, n])?)?;
    let delta = contiguous_mut("delta", problem.delta.view_mut(), exactly("delta", &[m, n])?)?;

    let we = problem
        .we
        .as_ref()
        .map(|v| contiguous("we", v.view(), exactly("we", &[nq, ld.ld2we, ld.ldwe])?))
        .transpose()?;
    let wd = problem
        .wd
        .as_ref()
        .map(|v| contiguous("wd", v.view(), exactly("wd", &[m, ld.ld2wd, ld.ldwd])?))
        .transpose()?;
    let ifixb = per_parameter("ifixb", problem.ifixb.as_ref().map(|v| v.view()), npar)?;
    let ifixx = problem
        .ifixx
        .as_ref()
        .map(|v| contiguous("ifixx", v.view(), exactly("ifixx", &[m, ld.ldifx])?))
        .transpose()?;
    let stpb = per_parameter("stpb", problem.stpb.as_ref().map(|v| v.view()), npar)?;
    let stpd = problem
        .stpd
        .as_ref()
        .map(|v| contiguous("stpd", v.view(), exactly("stpd", &[m, ld.ldstpd])?))
        .transpose()?;
    let sclb = per_parameter("sclb", problem.sclb.as_ref().map(|v| v.view()), npar)?;
    let scld = problem
        .scld
        .as_ref()
        .map(|v| contiguous("scld", v.view(), exactly("scld", &[m, ld.ldscld])?))
        .transpose()?;
    let lower = per_parameter("lower", problem.lower.as_ref().map(|v| v.view()), npar)?;
    let upper = per_parameter("upper", problem.upper.as_ref().map(|v| v.view()), npar)?;

    let work = problem
        .work
        .as_mut()
        .map(|v| contiguous_mut("work", v.view_mut(), Extent::NonEmpty))
        .transpose()?;
    let iwork = problem
        .iwork
        .as_mut()
        .map(|v| contiguous_mut("iwork", v.view_mut(), Extent::NonEmpty))
        .transpose()?;
    let (work, lwork) = work_ptr("work", work)?;
    let (iwork, liwork) = work_ptr("iwork", iwork)?;

    let s = &problem.settings;
    Ok(RawCall {
        n: to_c_int("n", n)?,
        m: to_c_int("m", m)?,
        npar: to_c_int("npar", npar)?,
        nq: to_c_int("nq", nq)?,
        ldwe: to_c_int("ldwe", ld.ldwe)?,
        ld2we: to_c_int("ld2we", ld.ld2we)?,
        ldwd: to_c_int("ldwd", ld.ldwd)?,
        ld2wd: to_c_int("ld2wd", ld.ld2wd)?,
        ldifx: to_c_int("ldifx", ld.ldifx)?,
        ldstpd: to_c_int("ldstpd", ld.ldstpd)?,
        ldscld: to_c_int("ldscld", ld.ldscld)?,
        lwork,
        liwork,

        beta: beta.as_mut_ptr(),
        y: y.as_ptr(),
        x: x.as_ptr(),
        we: array_ptr(we),
        wd: array_ptr(wd),
        ifixb: array_ptr(ifixb),
        ifixx: array_ptr(ifixx),
        stpb: array_ptr(stpb),
        stpd: array_ptr(stpd),
        sclb: array_ptr(sclb),
        scld: array_ptr(scld),
        delta: delta.as_mut_ptr(),
        lower: array_ptr(lower),
        upper: array_ptr(upper),
        work,
        iwork,

        job: scalar_ptr(s.job.as_ref().map(|j| j.as_raw())),
        ndigit: scalar_ptr(s.ndigit.as_ref()),
        taufac: scalar_ptr(s.taufac.as_ref()),
        sstol: scalar_ptr(s.sstol.as_ref()),
        partol: scalar_ptr(s.partol.as_ref()),
        maxit: scalar_ptr(s.maxit.as_ref()),
        iprint: scalar_ptr(s.iprint.as_ref()),

        lunerr: crate::streams::DEFAULT_UNIT,
        lunrpt: crate::streams::DEFAULT_UNIT,

        _borrow: PhantomData,
    })
}

fn per_parameter<'v, T>(
    name: &'static str, view: Option<ndarray::ArrayView1<'v, T>>, npar: usize,
) -> OdrResult<Option<&'v [T]>> {
    view.map(|v| contiguous(name, v, Extent::Exactly(npar))).transpose()
}
