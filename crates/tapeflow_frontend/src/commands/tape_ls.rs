//! `tape ls`: tapes matching a search. An unfiltered listing needs `--all`.

use tapeflow_catalogue::{Tape, TapeSearchCriteria};
use tapeflow_protocol::records::TapeLsItem;
use tapeflow_protocol::{BoolOpt, Record, RecordKind, StrListOpt, StrOpt, TapeState, U64Opt};

use crate::context::FrontendContext;
use crate::error::{FrontendError, Result};
use crate::query::Query;
use crate::stream::{CollectionSource, RecordSource};

pub fn criteria(query: &Query) -> Result<TapeSearchCriteria> {
    let owned = |key: StrOpt| query.get_str(key).map(str::to_string);
    let flag = |key: BoolOpt| query.options().bools.get(&key).copied();

    let state = query
        .get_str(StrOpt::State)
        .map(|raw| raw.parse::<TapeState>().map_err(FrontendError::validation))
        .transpose()?;

    let criteria = TapeSearchCriteria {
        vid: owned(StrOpt::Vid),
        media_type: owned(StrOpt::MediaType),
        vendor: owned(StrOpt::Vendor),
        logical_library: owned(StrOpt::LogicalLibrary),
        tape_pool: owned(StrOpt::TapePool),
        vo: owned(StrOpt::Vo),
        capacity_in_bytes: query.get_u64(U64Opt::Capacity),
        full: flag(BoolOpt::Full),
        from_castor: flag(BoolOpt::FromCastor),
        state,
        vids: query.get_str_list(StrListOpt::Vid).map(<[String]>::to_vec),
    };

    match (query.has_flag(BoolOpt::All), criteria.is_empty()) {
        (true, false) => Err(FrontendError::validation(
            "--all cannot be combined with search criteria",
        )),
        (false, true) => Err(FrontendError::validation(
            "Must specify at least one search option, or --all",
        )),
        _ => Ok(criteria),
    }
}

pub fn open(ctx: &FrontendContext, query: &Query) -> Result<Box<dyn RecordSource>> {
    let criteria = criteria(query)?;
    let tapes = ctx.catalogue.get_tapes(&criteria)?;
    let instance_name = ctx.instance_name.clone();

    Ok(CollectionSource::mapped(RecordKind::Tape, tapes, move |tape| {
        Record::Tape(to_item(&instance_name, tape))
    })
    .boxed())
}

fn to_item(instance_name: &str, tape: Tape) -> TapeLsItem {
    TapeLsItem {
        instance_name: instance_name.to_string(),
        vid: tape.vid,
        media_type: tape.media_type,
        vendor: tape.vendor,
        logical_library: tape.logical_library_name,
        physical_library: tape.physical_library_name.unwrap_or_default(),
        tapepool: tape.tape_pool_name,
        vo: tape.vo,
        encryption_key_name: tape.encryption_key_name.unwrap_or_default(),
        capacity: tape.capacity_in_bytes,
        occupancy: tape.data_on_tape_in_bytes,
        last_fseq: tape.last_fseq,
        full: tape.full,
        dirty: tape.dirty,
        from_castor: tape.is_from_castor,
        read_mount_count: tape.read_mount_count,
        write_mount_count: tape.write_mount_count,
        nb_master_files: tape.nb_master_files,
        master_data_in_bytes: tape.master_data_in_bytes,
        label_log: tape.label_log,
        last_write_log: tape.last_write_log,
        last_read_log: tape.last_read_log,
        creation_log: tape.creation_log,
        last_modification_log: tape.last_modification_log,
        comment: tape.comment,
        state: tape.state.to_string(),
        state_reason: tape.state_reason.unwrap_or_default(),
        state_update_time: tape.state_update_time,
        state_modified_by: tape.state_modified_by,
        purchase_order: tape.purchase_order.unwrap_or_default(),
        verification_status: tape.verification_status.unwrap_or_default(),
    }
}
