//! Feature support (byte 24): power management, colour, and timing flags.

use crate::{reserved, Edid, Error, VideoSignalType, FEATURE_SUPPORT};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive as _;

const STANDBY: u8 = 1 << 7;
const SUSPEND: u8 = 1 << 6;
const VERY_LOW_POWER: u8 = 1 << 5;
const SRGB_DEFAULT: u8 = 1 << 2;
const PREFERRED_TIMING_NATIVE: u8 = 1 << 1;
const CONTINUOUS_FREQUENCY: u8 = 1 << 0;

#[derive(Copy, Clone, Debug, FromPrimitive, PartialEq, Eq)]
pub enum ColorType {
    MonochromeOrGrayscale = 0,
    Rgb = 1,
    NonRgb = 2,
    Undefined = 3,
}

/// Colour encodings a digital display accepts beyond RGB 4:4:4.
#[derive(Copy, Clone, Debug, FromPrimitive, PartialEq, Eq)]
pub enum ColorFormat {
    Rgb444 = 0,
    Rgb444YCrCb444 = 1,
    Rgb444YCrCb422 = 2,
    Rgb444YCrCb444YCrCb422 = 3,
}

/// Bits 4..3, whose meaning follows the video signal type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DisplayColor {
    Analog(ColorType),
    Digital(ColorFormat),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FeatureSupport {
    pub standby_supported: bool,
    pub suspend_supported: bool,
    pub very_low_power_supported: bool,
    pub color: DisplayColor,
    pub srgb_default: bool,
    pub preferred_timing_is_native: bool,
    pub continuous_frequency: bool,
}

impl Edid {
    fn feature(&self, mask: u8) -> Result<bool, Error> {
        Ok(self.byte(&FEATURE_SUPPORT)? & mask != 0)
    }

    pub fn standby_supported(&self) -> Result<bool, Error> {
        self.feature(STANDBY)
    }

    pub fn suspend_supported(&self) -> Result<bool, Error> {
        self.feature(SUSPEND)
    }

    /// Active-off: the display consumes very little power when it receives
    /// no timing signal.
    pub fn very_low_power_supported(&self) -> Result<bool, Error> {
        self.feature(VERY_LOW_POWER)
    }

    pub fn display_color(&self) -> Result<DisplayColor, Error> {
        let byte = self.byte(&FEATURE_SUPPORT)?;
        let bits = (byte >> 3) & 0x3;

        let color = match self.video_signal_type()? {
            VideoSignalType::Analog => {
                ColorType::from_u8(bits).map(DisplayColor::Analog)
            }
            VideoSignalType::Digital => {
                ColorFormat::from_u8(bits).map(DisplayColor::Digital)
            }
        };

        color.ok_or_else(|| reserved(&FEATURE_SUPPORT, byte.into()))
    }

    pub fn color_type(&self) -> Result<ColorType, Error> {
        match self.display_color()? {
            DisplayColor::Analog(color_type) => Ok(color_type),
            DisplayColor::Digital(_) => Err(Error::BadField),
        }
    }

    pub fn color_format(&self) -> Result<ColorFormat, Error> {
        match self.display_color()? {
            DisplayColor::Digital(format) => Ok(format),
            DisplayColor::Analog(_) => Err(Error::BadField),
        }
    }

    pub fn srgb_default(&self) -> Result<bool, Error> {
        self.feature(SRGB_DEFAULT)
    }

    pub fn preferred_timing_is_native(&self) -> Result<bool, Error> {
        self.feature(PREFERRED_TIMING_NATIVE)
    }

    pub fn continuous_frequency(&self) -> Result<bool, Error> {
        self.feature(CONTINUOUS_FREQUENCY)
    }

    pub fn feature_support(&self) -> Result<FeatureSupport, Error> {
        Ok(FeatureSupport {
            standby_supported: self.standby_supported()?,
            suspend_supported: self.suspend_supported()?,
            very_low_power_supported: self.very_low_power_supported()?,
            color: self.display_color()?,
            srgb_default: self.srgb_default()?,
            preferred_timing_is_native: self.preferred_timing_is_native()?,
            continuous_frequency: self.continuous_frequency()?,
        })
    }
}
