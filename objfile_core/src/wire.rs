//! Binary packet encoding for [`NamedVars`].
//!
//! ```text
//! packet   := u32 entry_count, entry*
//! entry    := str name, u32 value_count, value*
//! value    := u16 type_tag, payload
//! payload  := i64 | f64 | u8 | str | u32 unit_count, u16*
//! str      := u32 byte_len, utf-8 bytes
//! ```
//!
//! All integers are big endian. Entries keep their order.

use crate::NamedValueList;
use crate::NamedVars;
use crate::ObjfileError;
use crate::ObjfileResult;
use crate::ValueCell;
use crate::ValueKind;
use crate::WireConfig;

impl NamedVars {
	/// Encode into a packet. Fails when a list holds more values than
	/// `config.max_values_per_list`.
	pub fn to_packet(&self, config: &WireConfig) -> ObjfileResult<Vec<u8>> {
		let mut writer = PacketWriter::default();
		writer.write_len(self.len(), "variables")?;

		for list in self {
			if list.len() > config.max_values_per_list {
				return Err(ObjfileError::PacketTooLarge {
					name: list.name().to_string(),
					count: list.len(),
					max: config.max_values_per_list,
				});
			}

			writer.write_str(list.name())?;
			writer.write_len(list.len(), list.name())?;

			for value in list.values() {
				writer.write_value(value)?;
			}
		}

		tracing::debug!(entries = self.len(), bytes = writer.buffer.len(), "encoded packet");
		Ok(writer.buffer)
	}

	/// Decode a packet produced by [`Self::to_packet`].
	pub fn from_packet(bytes: &[u8], config: &WireConfig) -> ObjfileResult<Self> {
		let mut reader = PacketReader::new(bytes);
		let entry_count = reader.read_len()?;
		let mut vars = Self::new();

		for _ in 0..entry_count {
			let name_offset = reader.offset;
			let name = reader.read_str()?;
			let count_offset = reader.offset;
			let value_count = reader.read_len()?;

			if value_count == 0 || value_count > config.max_values_per_list {
				return Err(ObjfileError::InvalidPacket {
					offset: count_offset,
					reason: format!(
						"value count {value_count} for `{name}` is outside 1..={}",
						config.max_values_per_list
					),
				});
			}

			let mut values = Vec::with_capacity(value_count.min(reader.remaining()));

			for _ in 0..value_count {
				values.push(reader.read_value()?);
			}

			let list = NamedValueList::with_values(name, values)?;

			if let Err(list) = vars.add_list(list) {
				return Err(ObjfileError::InvalidPacket {
					offset: name_offset,
					reason: format!("duplicate variable `{}`", list.name()),
				});
			}
		}

		if reader.remaining() > 0 {
			return Err(reader.error(format!("{} trailing bytes", reader.remaining())));
		}

		tracing::debug!(entries = vars.len(), bytes = bytes.len(), "decoded packet");
		Ok(vars)
	}
}

#[derive(Default)]
struct PacketWriter {
	buffer: Vec<u8>,
}

impl PacketWriter {
	fn write_len(&mut self, len: usize, name: &str) -> ObjfileResult<()> {
		let len = u32::try_from(len).map_err(|_| {
			ObjfileError::PacketTooLarge {
				name: name.to_string(),
				count: len,
				max: u32::MAX as usize,
			}
		})?;
		self.buffer.extend_from_slice(&len.to_be_bytes());
		Ok(())
	}

	fn write_str(&mut self, text: &str) -> ObjfileResult<()> {
		self.write_len(text.len(), text)?;
		self.buffer.extend_from_slice(text.as_bytes());
		Ok(())
	}

	fn write_value(&mut self, value: &ValueCell) -> ObjfileResult<()> {
		self.buffer
			.extend_from_slice(&value.kind().tag().to_be_bytes());

		match value {
			ValueCell::Int(value) => self.buffer.extend_from_slice(&value.to_be_bytes()),
			ValueCell::Float(value) => {
				self.buffer
					.extend_from_slice(&value.to_bits().to_be_bytes());
			}
			ValueCell::Bool(value) => self.buffer.push(u8::from(*value)),
			ValueCell::NarrowString(text) => self.write_str(text)?,
			ValueCell::WideString(units) => {
				self.write_len(units.len(), "wide string")?;

				for unit in units {
					self.buffer.extend_from_slice(&unit.to_be_bytes());
				}
			}
		}

		Ok(())
	}
}

struct PacketReader<'a> {
	bytes: &'a [u8],
	offset: usize,
}

impl<'a> PacketReader<'a> {
	fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, offset: 0 }
	}

	fn remaining(&self) -> usize {
		self.bytes.len() - self.offset
	}

	fn error(&self, reason: impl Into<String>) -> ObjfileError {
		ObjfileError::InvalidPacket {
			offset: self.offset,
			reason: reason.into(),
		}
	}

	fn take<const N: usize>(&mut self) -> ObjfileResult<[u8; N]> {
		let chunk = self
			.bytes
			.get(self.offset..self.offset + N)
			.and_then(|chunk| <[u8; N]>::try_from(chunk).ok())
			.ok_or_else(|| self.error(format!("expected {N} more bytes")))?;
		self.offset += N;
		Ok(chunk)
	}

	fn take_slice(&mut self, len: usize) -> ObjfileResult<&'a [u8]> {
		if len > self.remaining() {
			return Err(self.error(format!("expected {len} more bytes")));
		}

		let chunk = &self.bytes[self.offset..self.offset + len];
		self.offset += len;
		Ok(chunk)
	}

	fn read_len(&mut self) -> ObjfileResult<usize> {
		Ok(u32::from_be_bytes(self.take()?) as usize)
	}

	fn read_str(&mut self) -> ObjfileResult<String> {
		let len = self.read_len()?;
		let start = self.offset;
		let bytes = self.take_slice(len)?;

		String::from_utf8(bytes.to_vec()).map_err(|_| {
			ObjfileError::InvalidPacket {
				offset: start,
				reason: "string is not valid utf-8".to_string(),
			}
		})
	}

	fn read_value(&mut self) -> ObjfileResult<ValueCell> {
		let tag_offset = self.offset;
		let tag = u16::from_be_bytes(self.take()?);
		let kind = ValueKind::from_tag(tag).ok_or_else(|| {
			ObjfileError::InvalidPacket {
				offset: tag_offset,
				reason: format!("unknown type tag {tag}"),
			}
		})?;

		let value = match kind {
			ValueKind::Int => ValueCell::Int(i64::from_be_bytes(self.take()?)),
			ValueKind::Float => ValueCell::Float(f64::from_bits(u64::from_be_bytes(self.take()?))),
			ValueKind::Bool => {
				match self.take::<1>()? {
					[0] => ValueCell::Bool(false),
					[1] => ValueCell::Bool(true),
					[byte] => return Err(self.error(format!("invalid bool byte {byte}"))),
				}
			}
			ValueKind::NarrowString => ValueCell::NarrowString(self.read_str()?),
			ValueKind::WideString => {
				let len = self.read_len()?;
				let bytes = self.take_slice(len.saturating_mul(2))?;
				let units = bytes
					.chunks_exact(2)
					.map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
					.collect();
				ValueCell::WideString(units)
			}
		};

		Ok(value)
	}
}
