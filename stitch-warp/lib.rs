//! Geometry and blending stages of the stitcher: radial reprojection,
//! feathering masks, translation into canvas space and alpha compositing.

mod composite;
mod feather;
mod projection;
mod translate;

pub use composite::{AlphaCompositor, CompositeStats};
pub use feather::FeatherMaskBuilder;
pub use projection::RadialProjector;
pub use translate::translate;

use stitch_core::{AlphaRaster, ColorRaster, ProjectionParameters, StitchResult};

/// Projected image and its projected feather mask
#[derive(Debug, Clone)]
pub struct ProjectedImage {
    pub image: ColorRaster,
    pub mask: AlphaRaster,
}

/// Build the feather mask for `image` and project both with the same geometry
pub fn prewarp(image: &ColorRaster, params: ProjectionParameters) -> StitchResult<ProjectedImage> {
    let projector = RadialProjector::new(params);
    let mask = FeatherMaskBuilder::for_image(image)?;
    log::debug!(
        "Projecting {}x{} image ({}, f = {})",
        image.width(),
        image.height(),
        params.mode,
        params.focal_length
    );
    Ok(ProjectedImage {
        image: projector.project(image),
        mask: projector.project(&mask),
    })
}
