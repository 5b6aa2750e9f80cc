//! Video input definition (byte 20).
//!
//! Bit 7 selects an analog or a digital interface; the remaining bits mean
//! entirely different things for each.

use crate::{reserved, Edid, Error, INPUT_DEFINITION};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive as _;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VideoSignalType {
    Analog,
    Digital,
}

impl VideoSignalType {
    fn from_byte(byte: u8) -> Self {
        if byte & 0x80 == 0 {
            VideoSignalType::Analog
        } else {
            VideoSignalType::Digital
        }
    }
}

///
/// Video/sync/total voltage swing of an analog input, relative to blank.
///
#[derive(Copy, Clone, Debug, FromPrimitive, PartialEq, Eq)]
pub enum SignalLevelStandard {
    /// +0.700 / -0.300 V (1.000 V p-p)
    V0700S0300 = 0,
    /// +0.714 / -0.286 V (1.000 V p-p)
    V0714S0286 = 1,
    /// +1.000 / -0.400 V (1.400 V p-p)
    V1000S0400 = 2,
    /// +0.700 / 0.000 V (0.700 V p-p)
    V0700S0000 = 3,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlankingLevel {
    Black,
    Pedestal,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AnalogInput {
    pub signal_level_standard: SignalLevelStandard,
    pub blanking_level: BlankingLevel,
    pub separate_sync_supported: bool,
    pub composite_sync_supported: bool,
    pub sync_on_green_supported: bool,
    pub vsync_serration_supported: bool,
}

impl AnalogInput {
    fn from_byte(byte: u8) -> Result<Self, Error> {
        let bit = |n: u8| (byte >> n) & 1 == 1;

        let signal_level_standard =
            SignalLevelStandard::from_u8((byte >> 5) & 0x3)
                .ok_or_else(|| reserved(&INPUT_DEFINITION, byte.into()))?;

        Ok(Self {
            signal_level_standard,
            blanking_level: if bit(4) {
                BlankingLevel::Pedestal
            } else {
                BlankingLevel::Black
            },
            separate_sync_supported: bit(3),
            composite_sync_supported: bit(2),
            sync_on_green_supported: bit(1),
            vsync_serration_supported: bit(0),
        })
    }
}

#[derive(Copy, Clone, Debug, FromPrimitive, PartialEq, Eq)]
pub enum ColorDepth {
    Undefined = 0,
    Bpc6 = 1,
    Bpc8 = 2,
    Bpc10 = 3,
    Bpc12 = 4,
    Bpc14 = 5,
    Bpc16 = 6,
}

impl ColorDepth {
    pub fn bits_per_color(&self) -> Option<u8> {
        match self {
            ColorDepth::Undefined => None,
            ColorDepth::Bpc6 => Some(6),
            ColorDepth::Bpc8 => Some(8),
            ColorDepth::Bpc10 => Some(10),
            ColorDepth::Bpc12 => Some(12),
            ColorDepth::Bpc14 => Some(14),
            ColorDepth::Bpc16 => Some(16),
        }
    }
}

#[derive(Copy, Clone, Debug, FromPrimitive, PartialEq, Eq)]
pub enum VideoInterface {
    Undefined = 0,
    Dvi = 1,
    HdmiA = 2,
    HdmiB = 3,
    Mddi = 4,
    DisplayPort = 5,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DigitalInput {
    pub color_depth: ColorDepth,
    pub video_interface: VideoInterface,
}

impl DigitalInput {
    fn from_byte(byte: u8) -> Result<Self, Error> {
        // Depth 0b111 and interfaces 6 and up are reserved.
        let color_depth = ColorDepth::from_u8((byte >> 4) & 0x7)
            .ok_or_else(|| reserved(&INPUT_DEFINITION, byte.into()))?;

        let video_interface = VideoInterface::from_u8(byte & 0xf)
            .ok_or_else(|| reserved(&INPUT_DEFINITION, byte.into()))?;

        Ok(Self {
            color_depth,
            video_interface,
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputDefinition {
    Analog(AnalogInput),
    Digital(DigitalInput),
}

impl InputDefinition {
    pub fn signal_type(&self) -> VideoSignalType {
        match self {
            InputDefinition::Analog(_) => VideoSignalType::Analog,
            InputDefinition::Digital(_) => VideoSignalType::Digital,
        }
    }
}

impl Edid {
    pub fn video_signal_type(&self) -> Result<VideoSignalType, Error> {
        Ok(VideoSignalType::from_byte(self.byte(&INPUT_DEFINITION)?))
    }

    pub fn input_definition(&self) -> Result<InputDefinition, Error> {
        let byte = self.byte(&INPUT_DEFINITION)?;

        Ok(match VideoSignalType::from_byte(byte) {
            VideoSignalType::Analog => {
                InputDefinition::Analog(AnalogInput::from_byte(byte)?)
            }
            VideoSignalType::Digital => {
                InputDefinition::Digital(DigitalInput::from_byte(byte)?)
            }
        })
    }

    pub fn analog_input_definition(&self) -> Result<AnalogInput, Error> {
        let byte = self.byte(&INPUT_DEFINITION)?;

        match VideoSignalType::from_byte(byte) {
            VideoSignalType::Analog => AnalogInput::from_byte(byte),
            VideoSignalType::Digital => Err(Error::BadField),
        }
    }

    /// Digital interface details; reserved colour depth or interface values
    /// are [`Error::Corrupt`].
    pub fn digital_input_definition(&self) -> Result<DigitalInput, Error> {
        let byte = self.byte(&INPUT_DEFINITION)?;

        match VideoSignalType::from_byte(byte) {
            VideoSignalType::Digital => DigitalInput::from_byte(byte),
            VideoSignalType::Analog => Err(Error::BadField),
        }
    }
}
