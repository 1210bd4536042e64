//! Borsh encoding and decoding driven entirely by IDL type descriptions, so callers never need a
//! compiled-in struct layout for the program's accounts or instruction arguments.

use borsh::{
    BorshDeserialize,
    BorshSerialize,
};
use solana_sdk::pubkey::Pubkey;

use super::{
    account_discriminator,
    instruction_discriminator,
    Idl,
    IdlField,
    IdlType,
    IdlTypeDefinitionTy,
    IdlValue,
    DISCRIMINATOR_LEN,
};
use crate::error::InterfaceError;

/// Decodes account `data` as the IDL account type `type_name`.
///
/// The leading discriminator must match `type_name`. Bytes past the encoded value are ignored, as
/// accounts are usually allocated larger than their current contents.
///
/// # Errors
/// [`InterfaceError::Uninitialized`] when the account is shorter than a discriminator or its
/// discriminator is all zeroes, [`InterfaceError::DiscriminatorMismatch`] for another account
/// type, and [`InterfaceError::Malformed`] when the body doesn't decode.
pub fn decode_account(idl: &Idl, type_name: &str, data: &[u8]) -> Result<IdlValue, InterfaceError> {
    if data.len() < DISCRIMINATOR_LEN || data[..DISCRIMINATOR_LEN].iter().all(|b| *b == 0) {
        return Err(InterfaceError::Uninitialized);
    }
    let expected = account_discriminator(type_name);
    let mut actual = [0u8; DISCRIMINATOR_LEN];
    actual.copy_from_slice(&data[..DISCRIMINATOR_LEN]);
    if actual != expected {
        return Err(InterfaceError::DiscriminatorMismatch { expected, actual });
    }

    let mut reader = &data[DISCRIMINATOR_LEN..];
    decode_value(idl, &IdlType::Defined(type_name.to_string()), &mut reader)
}

/// Encodes `value` as the IDL account type `type_name`, discriminator first.
pub fn encode_account(idl: &Idl, type_name: &str, value: &IdlValue) -> Result<Vec<u8>, InterfaceError> {
    let mut out = account_discriminator(type_name).to_vec();
    encode_value(idl, &IdlType::Defined(type_name.to_string()), value, &mut out)?;
    Ok(out)
}

/// Encodes instruction data: the instruction discriminator followed by each argument in IDL order.
pub fn encode_instruction(idl: &Idl, name: &str, args: &[IdlValue]) -> Result<Vec<u8>, InterfaceError> {
    let instruction = idl.instruction(name)?;
    if instruction.args.len() != args.len() {
        return Err(InterfaceError::ArgumentCount {
            expected: instruction.args.len(),
            actual: args.len(),
        });
    }
    let mut out = instruction_discriminator(name).to_vec();
    for (field, value) in instruction.args.iter().zip(args) {
        encode_value(idl, &field.ty, value, &mut out)?;
    }
    Ok(out)
}

/// Decodes instruction data produced by [`encode_instruction`], returning the instruction's IDL
/// name and its arguments.
pub fn decode_instruction<'a>(
    idl: &'a Idl,
    data: &[u8],
) -> Result<(&'a str, Vec<IdlValue>), InterfaceError> {
    if data.len() < DISCRIMINATOR_LEN {
        return Err(InterfaceError::Malformed("instruction data too short".into()));
    }
    let instruction = idl
        .instructions
        .iter()
        .find(|ix| instruction_discriminator(&ix.name)[..] == data[..DISCRIMINATOR_LEN])
        .ok_or_else(|| InterfaceError::UnknownInstruction(format!("{:?}", &data[..DISCRIMINATOR_LEN])))?;

    let mut reader = &data[DISCRIMINATOR_LEN..];
    let args = instruction
        .args
        .iter()
        .map(|field| decode_value(idl, &field.ty, &mut reader))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((instruction.name.as_str(), args))
}

fn malformed(e: impl std::fmt::Display) -> InterfaceError {
    InterfaceError::Malformed(e.to_string())
}

fn read<T: BorshDeserialize>(reader: &mut &[u8]) -> Result<T, InterfaceError> {
    T::deserialize(reader).map_err(malformed)
}

fn struct_fields<'a>(idl: &'a Idl, name: &str) -> Result<&'a [IdlField], InterfaceError> {
    let IdlTypeDefinitionTy::Struct { fields } = &idl.type_definition(name)?.ty;
    Ok(fields)
}

pub fn decode_value(idl: &Idl, ty: &IdlType, reader: &mut &[u8]) -> Result<IdlValue, InterfaceError> {
    let value = match ty {
        IdlType::Bool => IdlValue::Bool(read::<bool>(reader)?),
        IdlType::U8 => IdlValue::Unsigned(read::<u8>(reader)?.into()),
        IdlType::U16 => IdlValue::Unsigned(read::<u16>(reader)?.into()),
        IdlType::U32 => IdlValue::Unsigned(read::<u32>(reader)?.into()),
        IdlType::U64 => IdlValue::Unsigned(read::<u64>(reader)?.into()),
        IdlType::U128 => IdlValue::Unsigned(read::<u128>(reader)?),
        IdlType::I8 => IdlValue::Signed(read::<i8>(reader)?.into()),
        IdlType::I16 => IdlValue::Signed(read::<i16>(reader)?.into()),
        IdlType::I32 => IdlValue::Signed(read::<i32>(reader)?.into()),
        IdlType::I64 => IdlValue::Signed(read::<i64>(reader)?.into()),
        IdlType::I128 => IdlValue::Signed(read::<i128>(reader)?),
        IdlType::String => IdlValue::String(read::<String>(reader)?),
        IdlType::Bytes => IdlValue::Bytes(read::<Vec<u8>>(reader)?),
        IdlType::PublicKey => IdlValue::PublicKey(Pubkey::new_from_array(read::<[u8; 32]>(reader)?)),
        IdlType::Vec(inner) => {
            let len = read::<u32>(reader)? as usize;
            // Every element the program declares takes at least one byte.
            if len > reader.len() {
                return Err(malformed(format!("vec length {len} exceeds remaining data")));
            }
            let items = (0..len)
                .map(|_| decode_value(idl, inner, reader))
                .collect::<Result<Vec<_>, _>>()?;
            IdlValue::Vec(items)
        }
        IdlType::Option(inner) => match read::<u8>(reader)? {
            0 => IdlValue::Option(None),
            1 => IdlValue::Option(Some(Box::new(decode_value(idl, inner, reader)?))),
            tag => return Err(malformed(format!("invalid option tag {tag}"))),
        },
        IdlType::Array(inner, len) => IdlValue::Array(
            (0..*len)
                .map(|_| decode_value(idl, inner, reader))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        IdlType::Defined(name) => IdlValue::Struct(
            struct_fields(idl, name)?
                .iter()
                .map(|field| Ok((field.name.clone(), decode_value(idl, &field.ty, reader)?)))
                .collect::<Result<Vec<_>, InterfaceError>>()?,
        ),
    };
    Ok(value)
}

fn write<T: BorshSerialize>(value: &T, out: &mut Vec<u8>) -> Result<(), InterfaceError> {
    value.serialize(out).map_err(malformed)
}

fn narrow<T: TryFrom<u128>>(ty: &IdlType, value: &IdlValue, v: u128) -> Result<T, InterfaceError> {
    T::try_from(v).map_err(|_| InterfaceError::TypeMismatch {
        expected: ty.to_string(),
        value: value.to_string(),
    })
}

fn narrow_signed<T: TryFrom<i128>>(ty: &IdlType, value: &IdlValue, v: i128) -> Result<T, InterfaceError> {
    T::try_from(v).map_err(|_| InterfaceError::TypeMismatch {
        expected: ty.to_string(),
        value: value.to_string(),
    })
}

pub fn encode_value(
    idl: &Idl,
    ty: &IdlType,
    value: &IdlValue,
    out: &mut Vec<u8>,
) -> Result<(), InterfaceError> {
    match (ty, value) {
        (IdlType::Bool, IdlValue::Bool(v)) => write(v, out),
        (IdlType::U8, IdlValue::Unsigned(v)) => write(&narrow::<u8>(ty, value, *v)?, out),
        (IdlType::U16, IdlValue::Unsigned(v)) => write(&narrow::<u16>(ty, value, *v)?, out),
        (IdlType::U32, IdlValue::Unsigned(v)) => write(&narrow::<u32>(ty, value, *v)?, out),
        (IdlType::U64, IdlValue::Unsigned(v)) => write(&narrow::<u64>(ty, value, *v)?, out),
        (IdlType::U128, IdlValue::Unsigned(v)) => write(v, out),
        (IdlType::I8, IdlValue::Signed(v)) => write(&narrow_signed::<i8>(ty, value, *v)?, out),
        (IdlType::I16, IdlValue::Signed(v)) => write(&narrow_signed::<i16>(ty, value, *v)?, out),
        (IdlType::I32, IdlValue::Signed(v)) => write(&narrow_signed::<i32>(ty, value, *v)?, out),
        (IdlType::I64, IdlValue::Signed(v)) => write(&narrow_signed::<i64>(ty, value, *v)?, out),
        (IdlType::I128, IdlValue::Signed(v)) => write(v, out),
        (IdlType::String, IdlValue::String(s)) => write(s, out),
        (IdlType::Bytes, IdlValue::Bytes(bytes)) => write(bytes, out),
        (IdlType::PublicKey, IdlValue::PublicKey(pk)) => write(&pk.to_bytes(), out),
        (IdlType::Vec(inner), IdlValue::Vec(items)) => {
            write(&narrow::<u32>(ty, value, items.len() as u128)?, out)?;
            items
                .iter()
                .try_for_each(|item| encode_value(idl, inner, item, out))
        }
        (IdlType::Option(_), IdlValue::Option(None)) => write(&0u8, out),
        (IdlType::Option(inner), IdlValue::Option(Some(item))) => {
            write(&1u8, out)?;
            encode_value(idl, inner, item, out)
        }
        (IdlType::Array(inner, len), IdlValue::Array(items)) if items.len() == *len => items
            .iter()
            .try_for_each(|item| encode_value(idl, inner, item, out)),
        (IdlType::Defined(name), IdlValue::Struct(fields)) => {
            for field in struct_fields(idl, name)? {
                let field_value = fields
                    .iter()
                    .find(|(n, _)| *n == field.name)
                    .map(|(_, v)| v)
                    .ok_or_else(|| malformed(format!("missing field `{}`", field.name)))?;
                encode_value(idl, &field.ty, field_value, out)?;
            }
            Ok(())
        }
        _ => Err(InterfaceError::TypeMismatch {
            expected: ty.to_string(),
            value: value.to_string(),
        }),
    }
}
