//! Catalogue table listings.
//!
//! Each one fetches the whole table and maps every entity to one record.

use tapeflow_catalogue::{
    ActivityMountRule, AdminUser, ArchiveRoute, DiskInstance, DiskInstanceSpace, DiskSystem,
    LogicalLibrary, MediaType, MountPolicy, MountRule, PhysicalLibrary, SchemaVersion,
    StorageClass, TapePool, VirtualOrganization,
};
use tapeflow_protocol::records::{
    ActivityMountRuleLsItem, AdminLsItem, ArchiveRouteLsItem, DiskInstanceLsItem,
    DiskInstanceSpaceLsItem, DiskSystemLsItem, LogicalLibraryLsItem, MediaTypeLsItem,
    MountPolicyLsItem, MountRuleLsItem, PhysicalLibraryLsItem, StorageClassLsItem,
    TapePoolLsItem, VersionItem, VirtualOrganizationLsItem,
};
use tapeflow_protocol::{Record, RecordKind};

use crate::context::FrontendContext;
use crate::error::Result;
use crate::query::Query;
use crate::stream::{CollectionSource, RecordSource};

// ============================================================================
// Sources
// ============================================================================

/// Fetch a whole table and map every entity to one record.
fn fetch_all<T>(
    kind: RecordKind,
    items: tapeflow_catalogue::Result<Vec<T>>,
    map: impl FnMut(T) -> Record,
) -> Result<Box<dyn RecordSource>> {
    Ok(CollectionSource::mapped(kind, items?, map).boxed())
}

pub fn admin_ls(ctx: &FrontendContext, _query: &Query) -> Result<Box<dyn RecordSource>> {
    let instance = ctx.instance_name.as_str();
    fetch_all(
        RecordKind::AdminUser,
        ctx.catalogue.get_admin_users(),
        |e| Record::AdminUser(admin_item(instance, e)),
    )
}

pub fn archive_route_ls(ctx: &FrontendContext, _query: &Query) -> Result<Box<dyn RecordSource>> {
    let instance = ctx.instance_name.as_str();
    fetch_all(
        RecordKind::ArchiveRoute,
        ctx.catalogue.get_archive_routes(),
        |e| Record::ArchiveRoute(archive_route_item(instance, e)),
    )
}

pub fn group_mount_rule_ls(ctx: &FrontendContext, _query: &Query) -> Result<Box<dyn RecordSource>> {
    let instance = ctx.instance_name.as_str();
    fetch_all(
        RecordKind::GroupMountRule,
        ctx.catalogue.get_requester_group_mount_rules(),
        |e| Record::GroupMountRule(mount_rule_item(instance, e)),
    )
}

pub fn requester_mount_rule_ls(
    ctx: &FrontendContext,
    _query: &Query,
) -> Result<Box<dyn RecordSource>> {
    let instance = ctx.instance_name.as_str();
    fetch_all(
        RecordKind::RequesterMountRule,
        ctx.catalogue.get_requester_mount_rules(),
        |e| Record::RequesterMountRule(mount_rule_item(instance, e)),
    )
}

pub fn activity_mount_rule_ls(
    ctx: &FrontendContext,
    _query: &Query,
) -> Result<Box<dyn RecordSource>> {
    let instance = ctx.instance_name.as_str();
    fetch_all(
        RecordKind::ActivityMountRule,
        ctx.catalogue.get_requester_activity_mount_rules(),
        |e| Record::ActivityMountRule(activity_mount_rule_item(instance, e)),
    )
}

pub fn logical_library_ls(ctx: &FrontendContext, _query: &Query) -> Result<Box<dyn RecordSource>> {
    let instance = ctx.instance_name.as_str();
    fetch_all(
        RecordKind::LogicalLibrary,
        ctx.catalogue.get_logical_libraries(),
        |e| Record::LogicalLibrary(logical_library_item(instance, e)),
    )
}

pub fn physical_library_ls(ctx: &FrontendContext, _query: &Query) -> Result<Box<dyn RecordSource>> {
    let instance = ctx.instance_name.as_str();
    fetch_all(
        RecordKind::PhysicalLibrary,
        ctx.catalogue.get_physical_libraries(),
        |e| Record::PhysicalLibrary(physical_library_item(instance, e)),
    )
}

pub fn media_type_ls(ctx: &FrontendContext, _query: &Query) -> Result<Box<dyn RecordSource>> {
    let instance = ctx.instance_name.as_str();
    fetch_all(
        RecordKind::MediaType,
        ctx.catalogue.get_media_types(),
        |e| Record::MediaType(media_type_item(instance, e)),
    )
}

pub fn mount_policy_ls(ctx: &FrontendContext, _query: &Query) -> Result<Box<dyn RecordSource>> {
    let instance = ctx.instance_name.as_str();
    fetch_all(
        RecordKind::MountPolicy,
        ctx.catalogue.get_mount_policies(),
        |e| Record::MountPolicy(mount_policy_item(instance, e)),
    )
}

pub fn storage_class_ls(ctx: &FrontendContext, _query: &Query) -> Result<Box<dyn RecordSource>> {
    let instance = ctx.instance_name.as_str();
    fetch_all(
        RecordKind::StorageClass,
        ctx.catalogue.get_storage_classes(),
        |e| Record::StorageClass(storage_class_item(instance, e)),
    )
}

pub fn tape_pool_ls(ctx: &FrontendContext, _query: &Query) -> Result<Box<dyn RecordSource>> {
    let instance = ctx.instance_name.as_str();
    fetch_all(
        RecordKind::TapePool,
        ctx.catalogue.get_tape_pools(),
        |e| Record::TapePool(tape_pool_item(instance, e)),
    )
}

pub fn disk_system_ls(ctx: &FrontendContext, _query: &Query) -> Result<Box<dyn RecordSource>> {
    let instance = ctx.instance_name.as_str();
    fetch_all(
        RecordKind::DiskSystem,
        ctx.catalogue.get_disk_systems(),
        |e| Record::DiskSystem(disk_system_item(instance, e)),
    )
}

pub fn disk_instance_ls(ctx: &FrontendContext, _query: &Query) -> Result<Box<dyn RecordSource>> {
    let instance = ctx.instance_name.as_str();
    fetch_all(
        RecordKind::DiskInstance,
        ctx.catalogue.get_disk_instances(),
        |e| Record::DiskInstance(disk_instance_item(instance, e)),
    )
}

pub fn disk_instance_space_ls(
    ctx: &FrontendContext,
    _query: &Query,
) -> Result<Box<dyn RecordSource>> {
    let instance = ctx.instance_name.as_str();
    fetch_all(
        RecordKind::DiskInstanceSpace,
        ctx.catalogue.get_disk_instance_spaces(),
        |e| Record::DiskInstanceSpace(disk_instance_space_item(instance, e)),
    )
}

pub fn virtual_organization_ls(
    ctx: &FrontendContext,
    _query: &Query,
) -> Result<Box<dyn RecordSource>> {
    let instance = ctx.instance_name.as_str();
    fetch_all(
        RecordKind::VirtualOrganization,
        ctx.catalogue.get_virtual_organizations(),
        |e| Record::VirtualOrganization(virtual_organization_item(instance, e)),
    )
}

/// Single record: server, catalogue and scheduler backend versions.
pub fn version(ctx: &FrontendContext, _query: &Query) -> Result<Box<dyn RecordSource>> {
    let schema = ctx.catalogue.get_schema_version()?;
    let item = version_item(&ctx.server_version, &ctx.scheduler_backend_name, &schema);
    Ok(CollectionSource::new(RecordKind::Version, vec![Record::Version(item)]).boxed())
}

// ============================================================================
// Entity -> item
// ============================================================================

fn admin_item(instance_name: &str, admin: AdminUser) -> AdminLsItem {
    AdminLsItem {
        instance_name: instance_name.to_string(),
        user: admin.name,
        creation_log: admin.creation_log,
        last_modification_log: admin.last_modification_log,
        comment: admin.comment,
    }
}

fn archive_route_item(instance_name: &str, route: ArchiveRoute) -> ArchiveRouteLsItem {
    ArchiveRouteLsItem {
        instance_name: instance_name.to_string(),
        storage_class: route.storage_class_name,
        copy_number: route.copy_nb,
        archive_route_type: route.route_type,
        tapepool: route.tape_pool_name,
        creation_log: route.creation_log,
        last_modification_log: route.last_modification_log,
        comment: route.comment,
    }
}

fn mount_rule_item(instance_name: &str, rule: MountRule) -> MountRuleLsItem {
    MountRuleLsItem {
        instance_name: instance_name.to_string(),
        disk_instance: rule.disk_instance,
        name: rule.name,
        mount_policy: rule.mount_policy,
        creation_log: rule.creation_log,
        last_modification_log: rule.last_modification_log,
        comment: rule.comment,
    }
}

fn activity_mount_rule_item(instance_name: &str, rule: ActivityMountRule) -> ActivityMountRuleLsItem {
    ActivityMountRuleLsItem {
        instance_name: instance_name.to_string(),
        disk_instance: rule.disk_instance,
        activity_mount_rule: rule.name,
        mount_policy: rule.mount_policy,
        activity_regex: rule.activity_regex,
        creation_log: rule.creation_log,
        last_modification_log: rule.last_modification_log,
        comment: rule.comment,
    }
}

fn logical_library_item(instance_name: &str, library: LogicalLibrary) -> LogicalLibraryLsItem {
    LogicalLibraryLsItem {
        instance_name: instance_name.to_string(),
        name: library.name,
        is_disabled: library.is_disabled,
        disabled_reason: library.disabled_reason.unwrap_or_default(),
        physical_library: library.physical_library_name.unwrap_or_default(),
        creation_log: library.creation_log,
        last_modification_log: library.last_modification_log,
        comment: library.comment,
    }
}

fn physical_library_item(instance_name: &str, library: PhysicalLibrary) -> PhysicalLibraryLsItem {
    PhysicalLibraryLsItem {
        instance_name: instance_name.to_string(),
        name: library.name,
        manufacturer: library.manufacturer,
        model: library.model,
        library_type: library.library_type.unwrap_or_default(),
        gui_url: library.gui_url.unwrap_or_default(),
        webcam_url: library.webcam_url.unwrap_or_default(),
        location: library.location.unwrap_or_default(),
        nb_physical_cartridge_slots: library.nb_physical_cartridge_slots,
        nb_available_cartridge_slots: library.nb_available_cartridge_slots.unwrap_or(0),
        nb_physical_drive_slots: library.nb_physical_drive_slots,
        is_disabled: library.is_disabled,
        disabled_reason: library.disabled_reason.unwrap_or_default(),
        creation_log: library.creation_log,
        last_modification_log: library.last_modification_log,
        comment: library.comment.unwrap_or_default(),
    }
}

fn media_type_item(instance_name: &str, media: MediaType) -> MediaTypeLsItem {
    MediaTypeLsItem {
        instance_name: instance_name.to_string(),
        name: media.name,
        cartridge: media.cartridge,
        capacity: media.capacity_in_bytes,
        primary_density_code: media.primary_density_code.unwrap_or(0),
        secondary_density_code: media.secondary_density_code.unwrap_or(0),
        number_of_wraps: media.nb_wraps.unwrap_or(0),
        min_lpos: media.min_lpos.unwrap_or(0),
        max_lpos: media.max_lpos.unwrap_or(0),
        creation_log: media.creation_log,
        last_modification_log: media.last_modification_log,
        comment: media.comment,
    }
}

fn mount_policy_item(instance_name: &str, policy: MountPolicy) -> MountPolicyLsItem {
    MountPolicyLsItem {
        instance_name: instance_name.to_string(),
        name: policy.name,
        archive_priority: policy.archive_priority,
        archive_min_request_age: policy.archive_min_request_age,
        retrieve_priority: policy.retrieve_priority,
        retrieve_min_request_age: policy.retrieve_min_request_age,
        creation_log: policy.creation_log,
        last_modification_log: policy.last_modification_log,
        comment: policy.comment,
    }
}

fn storage_class_item(instance_name: &str, class: StorageClass) -> StorageClassLsItem {
    StorageClassLsItem {
        instance_name: instance_name.to_string(),
        name: class.name,
        nb_copies: class.nb_copies,
        vo: class.vo,
        creation_log: class.creation_log,
        last_modification_log: class.last_modification_log,
        comment: class.comment,
    }
}

/// Percentage of `capacity` used by `data`, one decimal place. Zero capacity is 0%.
pub fn use_percent(data: u64, capacity: u64) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    let percent = data as f64 / capacity as f64 * 100.0;
    (percent * 10.0).round() / 10.0
}

fn tape_pool_item(instance_name: &str, pool: TapePool) -> TapePoolLsItem {
    TapePoolLsItem {
        instance_name: instance_name.to_string(),
        name: pool.name,
        vo: pool.vo,
        num_tapes: pool.nb_tapes,
        num_partial_tapes: pool.nb_partial_tapes,
        num_physical_files: pool.nb_physical_files,
        capacity_bytes: pool.capacity_bytes,
        data_bytes: pool.data_bytes,
        available_bytes: pool.capacity_bytes.saturating_sub(pool.data_bytes),
        use_percent: use_percent(pool.data_bytes, pool.capacity_bytes),
        encrypt: pool.encryption_key_name.is_some(),
        encryption_key_name: pool.encryption_key_name.unwrap_or_default(),
        supply_sources: pool.supply_source_set.into_iter().collect(),
        supply_destinations: pool.supply_destination_set.into_iter().collect(),
        creation_log: pool.creation_log,
        last_modification_log: pool.last_modification_log,
        comment: pool.comment,
    }
}

fn disk_system_item(instance_name: &str, system: DiskSystem) -> DiskSystemLsItem {
    DiskSystemLsItem {
        instance_name: instance_name.to_string(),
        name: system.name,
        file_regexp: system.file_regexp,
        disk_instance: system.disk_instance,
        disk_instance_space: system.disk_instance_space,
        targeted_free_space: system.targeted_free_space,
        sleep_time: system.sleep_time,
        creation_log: system.creation_log,
        last_modification_log: system.last_modification_log,
        comment: system.comment,
    }
}

fn disk_instance_item(instance_name: &str, instance: DiskInstance) -> DiskInstanceLsItem {
    DiskInstanceLsItem {
        instance_name: instance_name.to_string(),
        name: instance.name,
        creation_log: instance.creation_log,
        last_modification_log: instance.last_modification_log,
        comment: instance.comment,
    }
}

fn disk_instance_space_item(instance_name: &str, space: DiskInstanceSpace) -> DiskInstanceSpaceLsItem {
    DiskInstanceSpaceLsItem {
        instance_name: instance_name.to_string(),
        name: space.name,
        disk_instance: space.disk_instance,
        free_space_query_url: space.free_space_query_url,
        refresh_interval: space.refresh_interval,
        free_space: space.free_space,
        last_refresh_time: space.last_refresh_time,
        creation_log: space.creation_log,
        last_modification_log: space.last_modification_log,
        comment: space.comment,
    }
}

fn virtual_organization_item(instance_name: &str, vo: VirtualOrganization) -> VirtualOrganizationLsItem {
    VirtualOrganizationLsItem {
        instance_name: instance_name.to_string(),
        name: vo.name,
        read_max_drives: vo.read_max_drives,
        write_max_drives: vo.write_max_drives,
        max_file_size: vo.max_file_size,
        disk_instance: vo.disk_instance_name,
        is_repack_vo: vo.is_repack_vo,
        creation_log: vo.creation_log,
        last_modification_log: vo.last_modification_log,
        comment: vo.comment,
    }
}

fn version_item(server_version: &str, backend_name: &str, schema: &SchemaVersion) -> VersionItem {
    VersionItem {
        server_version: server_version.to_string(),
        catalogue_version: schema.display(),
        is_upgrading: schema.upgrading,
        scheduler_backend_name: backend_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrontendError;
    use tapeflow_catalogue::CatalogueError;

    #[test]
    fn test_fetch_all_propagates_catalogue_errors() {
        let failed: tapeflow_catalogue::Result<Vec<u64>> =
            Err(CatalogueError::invalid_state("table unreadable"));
        let err = fetch_all(RecordKind::MediaType, failed, |_| unreachable!()).err();
        assert!(matches!(err, Some(FrontendError::Catalogue(_))));
    }

    #[test]
    fn test_fetch_all_maps_every_entity() {
        let media = vec![
            MediaType {
                name: "LTO9".to_string(),
                ..Default::default()
            },
            MediaType {
                name: "LTO8".to_string(),
                ..Default::default()
            },
        ];
        let source = fetch_all(RecordKind::MediaType, Ok(media), |m| {
            Record::MediaType(media_type_item("tapeflow", m))
        })
        .unwrap();
        let mut stream = crate::stream::ResponseStream::new(source);
        assert!(stream.next().unwrap().is_header());
        match stream.next().unwrap() {
            Record::MediaType(item) => assert_eq!(item.name, "LTO9"),
            other => panic!("unexpected {:?}", other),
        }
        stream.next().unwrap();
        assert!(stream.is_done());
    }

    #[test]
    fn test_use_percent() {
        assert_eq!(use_percent(0, 0), 0.0);
        assert_eq!(use_percent(50, 0), 0.0);
        assert_eq!(use_percent(1, 3), 33.3);
        assert_eq!(use_percent(2, 3), 66.7);
        assert_eq!(use_percent(10, 10), 100.0);
    }

    #[test]
    fn test_tape_pool_derived_fields() {
        let pool = TapePool {
            name: "pool_a".to_string(),
            capacity_bytes: 1000,
            data_bytes: 250,
            encryption_key_name: Some("key1".to_string()),
            supply_source_set: ["pool_b".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let item = tape_pool_item("tapeflow", pool);
        assert_eq!(item.available_bytes, 750);
        assert_eq!(item.use_percent, 25.0);
        assert!(item.encrypt);
        assert_eq!(item.supply_sources, vec!["pool_b"]);
        assert!(item.supply_destinations.is_empty());
    }

    #[test]
    fn test_overfull_pool_has_no_available_bytes() {
        let pool = TapePool {
            capacity_bytes: 100,
            data_bytes: 120,
            ..Default::default()
        };
        assert_eq!(tape_pool_item("i", pool).available_bytes, 0);
    }

    #[test]
    fn test_optional_library_fields_default() {
        let item = physical_library_item("i", PhysicalLibrary::default());
        assert!(item.gui_url.is_empty());
        assert_eq!(item.nb_available_cartridge_slots, 0);
        assert!(item.comment.is_empty());
    }

    #[test]
    fn test_version_item() {
        let schema = SchemaVersion {
            major: 14,
            minor: 0,
            next_major: Some(15),
            next_minor: Some(0),
            upgrading: true,
        };
        let item = version_item("0.1.0", "ceph-a", &schema);
        assert_eq!(item.catalogue_version, "14.0 (upgrading to 15.0)");
        assert!(item.is_upgrading);
        assert_eq!(item.scheduler_backend_name, "ceph-a");
    }
}
