#![no_std]

//! edid1x: A crate for decoding the EDID 1.x base block
//!
//! A display describes itself to the source driving it with a 128-byte
//! Extended Display Identification Data (EDID) block, read over DDC from the
//! EEPROM behind I2C address 0x50.  This crate takes a copy of that block
//! (the transport is the caller's problem) and offers typed, validated
//! accessors for the fields of the base block.  The layout itself lives in
//! a RON file that, at build time via `build.rs`, is turned into the static
//! field definitions used here.
//!
//! Every accessor validates locally and yields either the decoded value or
//! a single [`Error`].  Fields whose meaning depends on another field (the
//! analog/digital input definition, size versus aspect ratio, the three
//! meanings of the week byte) refuse to decode under the wrong
//! interpretation with [`Error::BadField`], which is distinct from
//! [`Error::Corrupt`].
//!
//! The header check performed by [`Edid::verify`] deliberately does not
//! include the checksum; see [`Edid::verify_checksum`].

use core::fmt;
use log::{debug, trace};

mod features;
mod geometry;
mod input;

pub use features::*;
pub use geometry::*;
pub use input::*;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Contents {
    Byte,
    Word,
    WordBigEndian,
    Word32,
    Magic,
}

impl Contents {
    pub fn size(&self) -> usize {
        match self {
            Contents::Byte => 1,
            Contents::Word | Contents::WordBigEndian => 2,
            Contents::Word32 => 4,
            Contents::Magic => 8,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Payload<'a> {
    pub contents: Contents,
    pub data: &'a [u8],
}

impl<'a> Payload<'a> {
    pub fn from_slice(contents: Contents, slice: &'a [u8]) -> Option<Self> {
        let len = contents.size();

        if slice.len() < len {
            None
        } else {
            Some(Self {
                contents: contents,
                data: &slice[0..len],
            })
        }
    }

    pub fn value(&self) -> u64 {
        match self.contents {
            Contents::WordBigEndian => {
                let mut rval = 0u64;

                for i in 0..self.data.len() {
                    rval = (rval << 8) | self.data[i] as u64;
                }

                rval
            }
            _ => {
                let mut rval = 0u64;

                for i in 0..self.data.len() {
                    rval |= (self.data[i] as u64) << (i * 8);
                }

                rval
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Field<'a> {
    pub name: &'a str,
    pub offset: usize,
    pub contents: Contents,
}

impl<'a> Field<'a> {
    pub fn payload<'b>(&self, block: &'b [u8]) -> Option<Payload<'b>> {
        block
            .get(self.offset..)
            .and_then(|slice| Payload::from_slice(self.contents, slice))
    }
}

include!(concat!(env!("OUT_DIR"), "/fields.rs"));

///
/// The fixed eight bytes every EDID block starts with.
///
pub const MAGIC: [u8; 8] = [0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00];

/// Years in the date bytes count from here.
pub const YEAR_EPOCH: u16 = 1990;

// Compressed ASCII: 1 is 'A', so adding this yields the ASCII letter.
const MANUFACTURER_ASCII_OFFSET: u8 = 64;

const VERSION_MAX: u8 = 2;
const REVISION_MAX: u8 = 4;

///
/// Why an accessor produced no value.  The discriminants match the status
/// bits reported by the bridge firmware; kinds are never combined.
///
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A required input was absent (e.g. a source shorter than a block).
    NullArgument = 0x01,
    /// The block has no contents yet.
    NullData = 0x02,
    /// The field holds a value reserved by the standard.
    Corrupt = 0x04,
    /// A field the standard requires is blank.
    RequiredFieldBlank = 0x08,
    /// An optional field holds its "not specified" value.
    OptionalFieldBlank = 0x10,
    /// The field does not apply to this block; wrong accessor for its mode.
    BadField = 0x20,
}

impl Error {
    pub fn bits(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Error::NullArgument => "missing argument",
            Error::NullData => "EDID block not initialized",
            Error::Corrupt => "reserved value in EDID field",
            Error::RequiredFieldBlank => "required EDID field is blank",
            Error::OptionalFieldBlank => "optional EDID field not specified",
            Error::BadField => "EDID field does not apply to this display",
        };

        f.write_str(s)
    }
}

pub(crate) fn reserved(field: &Field, raw: u64) -> Error {
    debug!("{} holds reserved value 0x{:x}", field.name, raw);
    Error::Corrupt
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ManufacturerId([u8; 3]);

impl ManufacturerId {
    pub fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Display for ManufacturerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DateType {
    ManufactureYearOnly,
    ManufactureYearAndWeek,
    ModelYear,
    Corrupt,
}

///
/// The date bytes decoded under whichever of their three meanings the week
/// byte selects.
///
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Date {
    ManufactureYear(u16),
    ManufactureYearWeek { year: u16, week: u8 },
    ModelYear(u16),
}

impl Date {
    pub fn date_type(&self) -> DateType {
        match self {
            Date::ManufactureYear(_) => DateType::ManufactureYearOnly,
            Date::ManufactureYearWeek { .. } => DateType::ManufactureYearAndWeek,
            Date::ModelYear(_) => DateType::ModelYear,
        }
    }

    pub fn year(&self) -> u16 {
        match *self {
            Date::ManufactureYear(year)
            | Date::ManufactureYearWeek { year, .. }
            | Date::ModelYear(year) => year,
        }
    }
}

///
/// One EDID base block.  The contents are a snapshot: once filled by
/// [`Edid::init`] (or built by [`Edid::new`]) they are only ever read, so a
/// block may be shared freely between readers.  Filling the same block from
/// two contexts at once is the caller's to serialize.
///
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edid {
    data: Option<[u8; BLOCK_SIZE]>,
}

impl Default for Edid {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<[u8; BLOCK_SIZE]> for Edid {
    fn from(data: [u8; BLOCK_SIZE]) -> Self {
        Self { data: Some(data) }
    }
}

impl Edid {
    /// A block with no contents, suitable for static storage; every accessor
    /// reports [`Error::NullData`] until [`Edid::init`] succeeds.
    pub const fn empty() -> Self {
        Self { data: None }
    }

    pub fn new(data: &[u8; BLOCK_SIZE]) -> Self {
        Self { data: Some(*data) }
    }

    /// Builds a block from the first [`BLOCK_SIZE`] bytes of `source`.
    pub fn from_slice(source: &[u8]) -> Result<Self, Error> {
        let mut edid = Self::empty();
        edid.init(source)?;
        Ok(edid)
    }

    ///
    /// Copies the base block out of `source`, which may carry extension
    /// blocks after it.  Nothing is validated here; see [`Edid::verify`].
    ///
    pub fn init(&mut self, source: &[u8]) -> Result<(), Error> {
        if source.len() < BLOCK_SIZE {
            return Err(Error::NullArgument);
        }

        let mut data = [0u8; BLOCK_SIZE];
        data.copy_from_slice(&source[..BLOCK_SIZE]);
        self.data = Some(data);

        trace!("copied {}-byte EDID block", BLOCK_SIZE);

        Ok(())
    }

    pub fn as_bytes(&self) -> Result<&[u8; BLOCK_SIZE], Error> {
        self.data.as_ref().ok_or(Error::NullData)
    }

    fn payload(&self, field: &Field) -> Result<Payload<'_>, Error> {
        field.payload(self.as_bytes()?).ok_or(Error::NullData)
    }

    pub(crate) fn value(&self, field: &Field) -> Result<u64, Error> {
        Ok(self.payload(field)?.value())
    }

    pub(crate) fn byte(&self, field: &Field) -> Result<u8, Error> {
        Ok(self.value(field)? as u8)
    }

    /// Checks the fixed header; does not check the checksum.
    pub fn verify(&self) -> Result<(), Error> {
        let header = self.payload(&HEADER)?;

        if header.data != MAGIC {
            return Err(reserved(&HEADER, header.value()));
        }

        Ok(())
    }

    pub fn checksum_valid(&self) -> Result<bool, Error> {
        let sum = self
            .as_bytes()?
            .iter()
            .fold(0u8, |sum, b| sum.wrapping_add(*b));

        Ok(sum == 0)
    }

    ///
    /// The byte sum over the block must be 0 mod 256.  Not part of
    /// [`Edid::verify`]: displays in the field ship blocks that fail it and
    /// are otherwise perfectly usable.
    ///
    pub fn verify_checksum(&self) -> Result<(), Error> {
        if self.checksum_valid()? {
            Ok(())
        } else {
            Err(reserved(&CHECKSUM, self.value(&CHECKSUM)?))
        }
    }

    pub fn extension_count(&self) -> Result<u8, Error> {
        self.byte(&EXTENSION_COUNT)
    }

    pub fn manufacturer_id(&self) -> Result<ManufacturerId, Error> {
        let packed = self.value(&MANUFACTURER_ID)?;
        let mut code = [0u8; 3];

        // Bit 15 is reserved; the letters below never read it.
        if packed & 0x8000 != 0 {
            debug!("MANUFACTURER_ID 0x{:04x} sets reserved bit 15", packed);
        }

        for (i, c) in code.iter_mut().enumerate() {
            let letter = ((packed >> (10 - 5 * i)) & 0x1f) as u8;

            if letter == 0 || letter > 26 {
                debug!("MANUFACTURER_ID 0x{:04x} is not three letters", packed);
                return Err(Error::RequiredFieldBlank);
            }

            *c = letter + MANUFACTURER_ASCII_OFFSET;
        }

        Ok(ManufacturerId(code))
    }

    pub fn product_code(&self) -> Result<u16, Error> {
        Ok(self.value(&PRODUCT_CODE)? as u16)
    }

    pub fn serial_number(&self) -> Result<u32, Error> {
        match self.value(&SERIAL_NUMBER)? as u32 {
            0 => Err(Error::OptionalFieldBlank),
            serial => Ok(serial),
        }
    }

    fn year_byte(&self) -> Result<u8, Error> {
        match self.byte(&YEAR)? {
            year @ 0x00..=0x0f => Err(reserved(&YEAR, year.into())),
            year => Ok(year),
        }
    }

    fn week_byte(&self) -> Result<u8, Error> {
        match self.byte(&WEEK)? {
            week @ 0x37..=0xfe => Err(reserved(&WEEK, week.into())),
            week => Ok(week),
        }
    }

    pub fn date(&self) -> Result<Date, Error> {
        let year = YEAR_EPOCH + u16::from(self.year_byte()?);

        Ok(match self.week_byte()? {
            0x00 => Date::ManufactureYear(year),
            0xff => Date::ModelYear(year),
            week => Date::ManufactureYearWeek { year, week },
        })
    }

    /// Classifies the date bytes; reserved values classify as
    /// [`DateType::Corrupt`] rather than failing.
    pub fn date_type(&self) -> Result<DateType, Error> {
        match self.date() {
            Ok(date) => Ok(date.date_type()),
            Err(Error::Corrupt) => Ok(DateType::Corrupt),
            Err(e) => Err(e),
        }
    }

    ///
    /// Year of manufacture.  Only the year byte is validated, but a week byte
    /// of 0xff means the year byte holds a model year instead, which is
    /// [`Error::BadField`] here.
    ///
    pub fn manufacture_year(&self) -> Result<u16, Error> {
        let year = YEAR_EPOCH + u16::from(self.year_byte()?);

        if self.byte(&WEEK)? == 0xff {
            return Err(Error::BadField);
        }

        Ok(year)
    }

    pub fn manufacture_week(&self) -> Result<u8, Error> {
        self.year_byte()?;

        match self.week_byte()? {
            0x00 | 0xff => Err(Error::BadField),
            week => Ok(week),
        }
    }

    pub fn manufacture_year_week(&self) -> Result<(u16, u8), Error> {
        Ok((self.manufacture_year()?, self.manufacture_week()?))
    }

    pub fn model_year(&self) -> Result<u16, Error> {
        let year = YEAR_EPOCH + u16::from(self.year_byte()?);

        if self.byte(&WEEK)? != 0xff {
            return Err(Error::BadField);
        }

        Ok(year)
    }

    pub fn version(&self) -> Result<u8, Error> {
        match self.byte(&VERSION)? {
            version @ 1..=VERSION_MAX => Ok(version),
            version => Err(reserved(&VERSION, version.into())),
        }
    }

    pub fn revision(&self) -> Result<u8, Error> {
        match self.byte(&REVISION)? {
            revision @ 0..=REVISION_MAX => Ok(revision),
            revision => Err(reserved(&REVISION, revision.into())),
        }
    }

    pub fn version_revision(&self) -> Result<(u8, u8), Error> {
        Ok((self.version()?, self.revision()?))
    }
}


#[cfg(test)]
mod tests {
    extern crate std;
    use super::testdata::*;
    use super::*;
    use std::collections::HashSet;
    use std::*;

    #[test]
    fn dump() {
        let fields = fields();
        println!("{:#x?}", fields);
    }

    #[test]
    fn field_orthogonality() {
        let mut seen = 0;

        for field in fields() {
            let limit = field.offset + field.contents.size();
            assert!(field.offset >= seen);
            assert!(limit <= BLOCK_SIZE);
            println!(
                "0x{:02x} - 0x{:02x}:  {}",
                field.offset,
                limit - 1,
                field.name
            );
            seen = limit;
        }
    }

    #[test]
    fn field_names() {
        let mut names = HashSet::new();

        for field in fields() {
            match names.insert(field.name) {
                false => {
                    std::panic!("duplicate field {}", field.name);
                }
                true => {}
            }
        }
    }

    #[test]
    fn data() {
        let bytes = [0xde, 0x01, 0xce, 0xfa];

        let check = [
            (Contents::Byte, 0xdeu64),
            (Contents::Word, 0x1de),
            (Contents::WordBigEndian, 0xde01),
            (Contents::Word32, 0xface01de),
        ];

        for c in check.iter() {
            let p = Payload::from_slice(c.0, &bytes).unwrap();
            assert_eq!(p.value(), c.1);
        }

        assert_eq!(Payload::from_slice(Contents::Magic, &bytes), None);
    }

    #[test]
    fn init() {
        let mut edid = Edid::empty();
        assert_eq!(edid.verify(), Err(Error::NullData));
        assert_eq!(edid.product_code(), Err(Error::NullData));
        assert_eq!(edid.date_type(), Err(Error::NullData));

        assert_eq!(edid.init(&MONITOR[..100]), Err(Error::NullArgument));
        assert_eq!(edid.as_bytes(), Err(Error::NullData));

        let mut long = [0u8; 2 * BLOCK_SIZE];
        long[..BLOCK_SIZE].copy_from_slice(&MONITOR);
        edid.init(&long).unwrap();
        assert_eq!(edid.as_bytes().unwrap(), &MONITOR);
        assert_eq!(edid, Edid::new(&MONITOR));
        assert_eq!(Edid::from_slice(&[]), Err(Error::NullArgument));
    }

    #[test]
    fn verify() {
        assert_eq!(Edid::new(&MONITOR).verify(), Ok(()));

        for i in 0..MAGIC.len() {
            let mut data = MONITOR;
            data[i] ^= 0x01;
            assert_eq!(Edid::from(data).verify(), Err(Error::Corrupt));
        }

        assert_eq!(Edid::from([0u8; BLOCK_SIZE]).verify(), Err(Error::Corrupt));
    }

    #[test]
    fn checksum() {
        let edid = Edid::new(&MONITOR);
        assert_eq!(edid.checksum_valid(), Ok(false));
        assert_eq!(edid.verify_checksum(), Err(Error::Corrupt));
        assert_eq!(edid.verify(), Ok(()));

        let sum = MONITOR[..BLOCK_SIZE - 1]
            .iter()
            .fold(0u8, |sum, b| sum.wrapping_add(*b));
        let fixed = patched(&[(CHECKSUM, 0u8.wrapping_sub(sum))]);
        assert_eq!(fixed.checksum_valid(), Ok(true));
        assert_eq!(fixed.verify_checksum(), Ok(()));
        assert_eq!(fixed.extension_count(), Ok(0));
    }

    #[test]
    fn extension_count() {
        assert_eq!(patched(&[(EXTENSION_COUNT, 1)]).extension_count(), Ok(1));
        assert_eq!(
            patched(&[(EXTENSION_COUNT, 0xff)]).extension_count(),
            Ok(0xff)
        );
        assert_eq!(Edid::empty().extension_count(), Err(Error::NullData));
    }

    #[test]
    fn manufacturer_reserved_bit() {
        let mut data = MONITOR;
        data[8] |= 0x80;
        assert_eq!(Edid::from(data).manufacturer_id().unwrap().as_str(), "DEL");
    }

    #[test]
    fn monitor() {
        let edid = Edid::new(&MONITOR);

        let id = edid.manufacturer_id().unwrap();
        assert_eq!(id.as_str(), "DEL");
        assert_eq!(format!("{}", id), "DEL");
        assert_eq!(edid.product_code(), Ok(0x1234));
        assert_eq!(edid.serial_number(), Ok(0x424b2e66));
        assert_eq!(edid.date_type(), Ok(DateType::ManufactureYearAndWeek));
        assert_eq!(edid.manufacture_year_week(), Ok((2010, 14)));
        assert_eq!(edid.version_revision(), Ok((1, 3)));
    }

    #[test]
    fn monitor_week_is_calendar_week() {
        use chrono::{Datelike, NaiveDate, Weekday};

        let (year, week) = Edid::new(&MONITOR).manufacture_year_week().unwrap();
        let monday =
            NaiveDate::from_isoywd_opt(year.into(), week.into(), Weekday::Mon)
                .unwrap();
        assert_eq!(monday.iso_week().week(), u32::from(week));
        assert_eq!(monday.year(), i32::from(year));
    }

    #[test]
    fn manufacturer_id() {
        // 'A' 'Z' 'Z': 0 00001 11010 11010
        let mut data = MONITOR;
        data[8] = 0x07;
        data[9] = 0x5a;
        assert_eq!(Edid::from(data).manufacturer_id().unwrap().as_str(), "AZZ");

        // Each letter in turn 0, then each letter in turn 27.
        let blank = [
            (0x00, 0xac),
            (0x10, 0x0c),
            (0x10, 0xa0),
            (0x6c, 0xac),
            (0x13, 0x6c),
            (0x10, 0xbb),
        ];

        for (hi, lo) in blank.iter() {
            let mut data = MONITOR;
            data[8] = *hi;
            data[9] = *lo;
            assert_eq!(
                Edid::from(data).manufacturer_id(),
                Err(Error::RequiredFieldBlank)
            );
        }
    }

    #[test]
    fn serial_number() {
        let mut data = MONITOR;
        data[12..16].copy_from_slice(&[0, 0, 0, 0]);
        assert_eq!(
            Edid::from(data).serial_number(),
            Err(Error::OptionalFieldBlank)
        );
    }

    #[test]
    fn year_only() {
        let edid = patched(&[(WEEK, 0x00)]);
        assert_eq!(edid.date_type(), Ok(DateType::ManufactureYearOnly));
        assert_eq!(edid.date(), Ok(Date::ManufactureYear(2010)));
        assert_eq!(edid.manufacture_year(), Ok(2010));
        assert_eq!(edid.manufacture_week(), Err(Error::BadField));
        assert_eq!(edid.manufacture_year_week(), Err(Error::BadField));
        assert_eq!(edid.model_year(), Err(Error::BadField));
    }

    #[test]
    fn model_year() {
        let edid = patched(&[(WEEK, 0xff), (YEAR, 0x1e)]);
        assert_eq!(edid.date_type(), Ok(DateType::ModelYear));
        assert_eq!(edid.model_year(), Ok(2020));
        assert_eq!(edid.date().map(|d| d.year()), Ok(2020));
        assert_eq!(edid.manufacture_week(), Err(Error::BadField));
        assert_eq!(edid.manufacture_year(), Err(Error::BadField));
        assert_eq!(edid.manufacture_year_week(), Err(Error::BadField));
    }

    #[test]
    fn reserved_dates() {
        for week in [0x00, 0x01, 0x36, 0x37, 0xfe, 0xff].iter() {
            for year in [0x00, 0x0f].iter() {
                let edid = patched(&[(WEEK, *week), (YEAR, *year)]);
                assert_eq!(edid.date_type(), Ok(DateType::Corrupt));
                assert_eq!(edid.date(), Err(Error::Corrupt));
                assert_eq!(edid.manufacture_year(), Err(Error::Corrupt));
                assert_eq!(edid.manufacture_week(), Err(Error::Corrupt));
                assert_eq!(edid.manufacture_year_week(), Err(Error::Corrupt));
                assert_eq!(edid.model_year(), Err(Error::Corrupt));
            }
        }

        for week in [0x37, 0x80, 0xfe].iter() {
            let edid = patched(&[(WEEK, *week)]);
            assert_eq!(edid.date_type(), Ok(DateType::Corrupt));
            assert_eq!(edid.manufacture_week(), Err(Error::Corrupt));
            assert_eq!(edid.manufacture_year(), Ok(2010));
            assert_eq!(edid.model_year(), Err(Error::BadField));
        }

        let edid = patched(&[(WEEK, 0x36), (YEAR, 0x10)]);
        assert_eq!(edid.manufacture_year_week(), Ok((2006, 54)));
    }

    #[test]
    fn version_revision() {
        for (version, revision, ok) in [
            (1, 0, true),
            (1, 4, true),
            (2, 0, true),
            (0, 3, false),
            (3, 3, false),
            (1, 5, false),
        ]
        .iter()
        {
            let edid = patched(&[(VERSION, *version), (REVISION, *revision)]);
            let rval = edid.version_revision();

            if *ok {
                assert_eq!(rval, Ok((*version, *revision)));
            } else {
                assert_eq!(rval, Err(Error::Corrupt));
            }
        }

        let edid = patched(&[(VERSION, 0)]);
        assert_eq!(edid.version(), Err(Error::Corrupt));
        assert_eq!(edid.revision(), Ok(3));

        let edid = patched(&[(REVISION, 0xff)]);
        assert_eq!(edid.version(), Ok(1));
        assert_eq!(edid.revision(), Err(Error::Corrupt));
    }

    #[test]
    fn error_bits() {
        let errors = [
            Error::NullArgument,
            Error::NullData,
            Error::Corrupt,
            Error::RequiredFieldBlank,
            Error::OptionalFieldBlank,
            Error::BadField,
        ];

        for (i, e) in errors.iter().enumerate() {
            assert_eq!(e.bits(), 1u8 << i);
        }
    }
}
