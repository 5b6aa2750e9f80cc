//! Screen geometry (bytes 21 and 22) and gamma (byte 23).
//!
//! The two geometry bytes hold either an absolute size in centimeters or,
//! when exactly one of them is zero, an aspect ratio packed into the other.

use crate::{Edid, Error, GAMMA, HORIZONTAL_SIZE, VERTICAL_SIZE};
use log::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RatioType {
    Portrait,
    Landscape,
    Size,
    Undefined,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScreenSize {
    pub horizontal_cm: u8,
    pub vertical_cm: u8,
}

///
/// The geometry bytes under their single valid interpretation; the ratio
/// variants carry the raw byte the ratio is packed into.
///
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Geometry {
    Undefined,
    Portrait(u8),
    Landscape(u8),
    Size(ScreenSize),
}

impl Geometry {
    fn from_bytes(horizontal: u8, vertical: u8) -> Self {
        match (horizontal, vertical) {
            (0, 0) => Geometry::Undefined,
            (0, v) => Geometry::Portrait(v),
            (h, 0) => Geometry::Landscape(h),
            (h, v) => Geometry::Size(ScreenSize {
                horizontal_cm: h,
                vertical_cm: v,
            }),
        }
    }

    pub fn ratio_type(&self) -> RatioType {
        match self {
            Geometry::Undefined => RatioType::Undefined,
            Geometry::Portrait(_) => RatioType::Portrait,
            Geometry::Landscape(_) => RatioType::Landscape,
            Geometry::Size(_) => RatioType::Size,
        }
    }

    /// Width over height, where the ratio is what is encoded.
    pub fn aspect_ratio(&self) -> Option<f32> {
        match *self {
            Geometry::Portrait(v) => Some(100.0 / (f32::from(v) + 99.0)),
            Geometry::Landscape(h) => Some((f32::from(h) + 99.0) / 100.0),
            _ => None,
        }
    }
}

impl Edid {
    pub fn geometry(&self) -> Result<Geometry, Error> {
        Ok(Geometry::from_bytes(
            self.byte(&HORIZONTAL_SIZE)?,
            self.byte(&VERTICAL_SIZE)?,
        ))
    }

    pub fn ratio_type(&self) -> Result<RatioType, Error> {
        Ok(self.geometry()?.ratio_type())
    }

    pub fn portrait_ratio(&self) -> Result<f32, Error> {
        match self.geometry()? {
            g @ Geometry::Portrait(_) => g.aspect_ratio().ok_or(Error::BadField),
            _ => Err(Error::BadField),
        }
    }

    pub fn landscape_ratio(&self) -> Result<f32, Error> {
        match self.geometry()? {
            g @ Geometry::Landscape(_) => g.aspect_ratio().ok_or(Error::BadField),
            _ => Err(Error::BadField),
        }
    }

    pub fn screen_size(&self) -> Result<ScreenSize, Error> {
        match self.geometry()? {
            Geometry::Size(size) => Ok(size),
            _ => Err(Error::BadField),
        }
    }

    ///
    /// Display transfer characteristic, 1.00 through 3.54.  A raw 0xff means
    /// the value lives in an extension block, which is not decoded here.
    ///
    pub fn gamma(&self) -> Result<f32, Error> {
        match self.byte(&GAMMA)? {
            0xff => {
                debug!("GAMMA deferred to an extension block");
                Err(Error::RequiredFieldBlank)
            }
            raw => Ok((f32::from(raw) + 100.0) / 100.0),
        }
    }
}
