//! `recycletf ls`: recycle-log search, streamed as the catalogue cursor advances.

use tapeflow_catalogue::{RecycleTapeFile, RecycleTapeFileSearchCriteria};
use tapeflow_protocol::records::RecycleTapeFileLsItem;
use tapeflow_protocol::{Record, RecordKind, StrListOpt, StrOpt, U64Opt};

use crate::context::FrontendContext;
use crate::error::Result;
use crate::query::Query;
use crate::stream::{CursorSource, RecordSource};

pub fn criteria(query: &Query) -> RecycleTapeFileSearchCriteria {
    // --fxid and --fxidfile both select by disk file id
    let mut disk_file_ids: Vec<String> = query
        .get_str_list(StrListOpt::FileId)
        .map(<[String]>::to_vec)
        .unwrap_or_default();
    if let Some(fxid) = query.get_str(StrOpt::Fxid) {
        disk_file_ids.push(fxid.to_string());
    }

    RecycleTapeFileSearchCriteria {
        vid: query.get_str(StrOpt::Vid).map(str::to_string),
        disk_file_ids: (!disk_file_ids.is_empty()).then_some(disk_file_ids),
        archive_file_id: query.get_u64(U64Opt::ArchiveFileId),
        copy_nb: query.get_u64(U64Opt::CopyNumber),
        disk_instance: query.get_str(StrOpt::Instance).map(str::to_string),
    }
}

pub fn open(ctx: &FrontendContext, query: &Query) -> Result<Box<dyn RecordSource>> {
    let cursor = ctx.catalogue.get_recycle_tape_files(&criteria(query))?;
    let instance_name = ctx.instance_name.clone();

    Ok(Box::new(CursorSource::new(
        RecordKind::RecycleTapeFile,
        cursor,
        move |file| Record::RecycleTapeFile(to_item(&instance_name, file)),
    )))
}

fn to_item(instance_name: &str, file: RecycleTapeFile) -> RecycleTapeFileLsItem {
    RecycleTapeFileLsItem {
        instance_name: instance_name.to_string(),
        vid: file.vid,
        fseq: file.fseq,
        block_id: file.block_id,
        copy_nb: file.copy_nb,
        tape_file_creation_time: file.tape_file_creation_time,
        archive_file_id: file.archive_file_id,
        disk_instance: file.disk_instance_name,
        disk_file_id: file.disk_file_id,
        disk_file_id_when_deleted: file.disk_file_id_when_deleted,
        disk_file_uid: file.disk_file_uid,
        disk_file_gid: file.disk_file_gid,
        size_in_bytes: file.size_in_bytes,
        storage_class: file.storage_class,
        archive_file_creation_time: file.archive_file_creation_time,
        reconciliation_time: file.reconciliation_time,
        disk_file_path: file.disk_file_path.unwrap_or_default(),
        reason_log: file.reason_log,
        recycle_log_time: file.recycle_log_time,
    }
}
